use std::cmp::Ordering;
use std::fmt::{self, Display, Write};

use bitflags::bitflags;
use log::warn;
use winnow::binary::{le_u16, le_u32, u8};
use winnow::prelude::*;
use winnow::token::take;

use crate::qualifiers::{self, name_of};
use crate::structs::locale::{
    self, ENGLISH, UNITED_STATES, ascii_field, compare_regions, is_close_to_us_english,
    langs_are_equivalent,
};

bitflags! {
    /// Bitmask for configuration changes and qualifiers from Android's AConfiguration.
    ///
    /// Type spec chunks store one of these per entry, naming the axes the entry varies on.
    ///
    /// [Source Code](https://cs.android.com/android/platform/superproject/main/+/main:frameworks/native/include/android/configuration.h;l=57)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResTableConfigFlags: u32 {
        /// Bit mask for Mobile Country Code (MCC) configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#mcc>
        const CONFIG_MCC = 0x0001;

        /// Bit mask for Mobile Network Code (MNC) configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#mnc>
        const CONFIG_MNC = 0x0002;

        /// Bit mask for locale configuration (language, region, script and variant).
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#LocaleQualifier>
        const CONFIG_LOCALE = 0x0004;

        /// Bit mask for touchscreen configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#TouchscreenQualifier>
        const CONFIG_TOUCHSCREEN = 0x0008;

        /// Bit mask for keyboard type configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#ImeQualifier>
        const CONFIG_KEYBOARD = 0x0010;

        /// Bit mask for keyboard availability (hidden/shown).
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#KeyboardAvailQualifier>
        const CONFIG_KEYBOARD_HIDDEN = 0x0020;

        /// Bit mask for navigation method configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#NavigationQualifier>
        const CONFIG_NAVIGATION = 0x0040;

        /// Bit mask for screen orientation configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#OrientationQualifier>
        const CONFIG_ORIENTATION = 0x0080;

        /// Bit mask for screen density configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#DensityQualifier>
        const CONFIG_DENSITY = 0x0100;

        /// Bit mask for screen size configuration, covers width/height dp and pixel size.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#ScreenSizeQualifier>
        const CONFIG_SCREEN_SIZE = 0x0200;

        /// Bit mask for platform version configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#VersionQualifier>
        const CONFIG_VERSION = 0x0400;

        /// Bit mask for screen layout (long/short, size).
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#ScreenAspectQualifier>
        const CONFIG_SCREEN_LAYOUT = 0x0800;

        /// Bit mask for UI mode (normal, car, desk, watch, night, etc.).
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#UiModeQualifier>
        const CONFIG_UI_MODE = 0x1000;

        /// Bit mask for smallest screen width configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#SmallestScreenWidthQualifier>
        const CONFIG_SMALLEST_SCREEN_SIZE = 0x2000;

        /// Bit mask for layout direction (LTR or RTL).
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#LayoutDirectionQualifier>
        const CONFIG_LAYOUTDIR = 0x4000;

        /// Bit mask for screen roundness (round or not).
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#ScreenRoundQualifier>
        const CONFIG_SCREEN_ROUND = 0x8000;

        /// Bit mask for wide color gamut and HDR configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#WideColorGamutQualifier>
        const CONFIG_COLOR_MODE = 0x10000;

        /// Bit mask for grammatical gender configuration.
        /// See: <https://developer.android.com/guide/topics/resources/providing-resources#GrammaticalInflectionQualifier>
        const CONFIG_GRAMMATICAL_GENDER = 0x20000;

        /// Additional flag indicating an entry is public
        const SPEC_PUBLIC = 0x40000000;

        /// Additional flag indicating the resource id for this resource may change in a future build.
        /// If this flag is set, the SPEC_PUBLIC flag is also set since the resource must be
        /// public to be exposed as an API to other applications.
        const SPEC_STAGED_API = 0x20000000;
    }
}

/// Mobile network code 0 (`mnc00`), kept apart from "unspecified"
pub const MNC_ZERO: u16 = 0xffff;

/// Orientation: value that corresponds to `port` resource qualifier
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#OrientationQualifier>
pub const ORIENTATION_PORT: u8 = 0x01;

/// Orientation: value that corresponds to `land` resource qualifier
pub const ORIENTATION_LAND: u8 = 0x02;

/// Touchscreen: value that corresponds to `finger` resource qualifier
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#TouchscreenQualifier>
pub const TOUCHSCREEN_FINGER: u8 = 0x03;

/// Density: default density, no qualifier
pub const DENSITY_DEFAULT: u16 = 0;

/// Density: value that corresponds to `ldpi` resource qualifier
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#DensityQualifier>
pub const DENSITY_LOW: u16 = 120;

/// Density: value that corresponds to `mdpi` resource qualifier, the baseline
pub const DENSITY_MEDIUM: u16 = 160;

/// Density: value that corresponds to `hdpi` resource qualifier
pub const DENSITY_HIGH: u16 = 240;

/// Density: value that corresponds to `xhdpi` resource qualifier
pub const DENSITY_XHIGH: u16 = 320;

/// Density: value that corresponds to `xxhdpi` resource qualifier
pub const DENSITY_XXHIGH: u16 = 480;

/// Density: value that corresponds to `anydpi` resource qualifier, scales to any density
pub const DENSITY_ANY: u16 = 0xfffe;

/// Density: value that corresponds to `nodpi` resource qualifier, never scaled
pub const DENSITY_NONE: u16 = 0xffff;

/// Keyboard availability bits of `input_flags`
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#KeyboardAvailQualifier>
pub const MASK_KEYSHIDDEN: u8 = 0x03;

/// Keys hidden: value that corresponds to `keysexposed` resource qualifier
pub const KEYSHIDDEN_NO: u8 = 0x01;

/// Keys hidden: value that corresponds to `keyssoft` resource qualifier
pub const KEYSHIDDEN_SOFT: u8 = 0x03;

/// Navigation availability bits of `input_flags`
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#NavigationQualifier>
pub const MASK_NAVHIDDEN: u8 = 0x0c;

/// Screen size bucket bits of `screen_layout`
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#ScreenSizeQualifier>
pub const MASK_SCREENSIZE: u8 = 0x0f;

/// Screen size: value that corresponds to `normal` resource qualifier
pub const SCREENSIZE_NORMAL: u8 = 0x02;

/// Screen aspect bits of `screen_layout` (`long`, `notlong`)
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#ScreenAspectQualifier>
pub const MASK_SCREENLONG: u8 = 0x30;

/// Layout direction bits of `screen_layout` (`ldltr`, `ldrtl`)
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#LayoutDirectionQualifier>
pub const MASK_LAYOUTDIR: u8 = 0xc0;

/// UI mode type bits of `ui_mode`
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#UiModeQualifier>
pub const MASK_UI_MODE_TYPE: u8 = 0x0f;

/// UI mode type: value that corresponds to `vrheadset` resource qualifier
pub const UI_MODE_TYPE_VR_HEADSET: u8 = 0x07;

/// Night mode bits of `ui_mode` (`night`, `notnight`)
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#NightQualifier>
pub const MASK_UI_MODE_NIGHT: u8 = 0x30;

/// Screen roundness bits of `screen_layout2` (`round`, `notround`)
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#ScreenRoundQualifier>
pub const MASK_SCREENROUND: u8 = 0x03;

/// Wide color gamut bits of `color_mode` (`widecg`, `nowidecg`)
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#WideColorGamutQualifier>
pub const MASK_WIDE_COLOR_GAMUT: u8 = 0x03;

/// High dynamic range bits of `color_mode` (`highdr`, `lowdr`)
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#HDRQualifier>
pub const MASK_HDR: u8 = 0x0c;

/// Grammatical gender bits of `grammatical_inflection`
/// See: <https://developer.android.com/guide/topics/resources/providing-resources#GrammaticalInflectionQualifier>
pub const MASK_GRAMMATICAL_GENDER: u8 = 0x03;

/// Describes a particular resource configuration
///
/// Every field uses 0 for "unspecified". On disk the structure is prefixed
/// with its own size, and older tools write shorter versions of it.
///
/// [Source code](https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=967)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResTableConfig {
    /// Number of bytes in this structure as read from disk
    pub size: u32,

    /// Mobile country code (from SIM)
    pub mcc: u16,

    /// Mobile network code (from SIM), [MNC_ZERO] stands for "00"
    pub mnc: u16,

    /// Two ASCII letters, or a packed ISO-639-2 code (see [locale::pack_language])
    pub language: [u8; 2],

    /// Two ASCII letters, or a packed UN M.49 code (see [locale::pack_region])
    pub country: [u8; 2],

    pub orientation: u8,
    pub touchscreen: u8,
    pub density: u16,

    pub keyboard: u8,
    pub navigation: u8,
    pub input_flags: u8,
    pub grammatical_inflection: u8,

    pub screen_width: u16,
    pub screen_height: u16,

    pub sdk_version: u16,

    /// For now minor_version must always be 0
    pub minor_version: u16,

    pub screen_layout: u8,
    pub ui_mode: u8,
    pub smallest_screen_width_dp: u16,

    pub screen_width_dp: u16,
    pub screen_height_dp: u16,

    /// The ISO-15924 short name for the script corresponding to this configuration
    pub locale_script: [u8; 4],

    /// A single BCP-47 variant subtag, zero padded
    pub locale_variant: [u8; 8],

    pub screen_layout2: u8,
    pub color_mode: u8,

    /// If false and `locale_script` is set, the script was provided by the user
    pub locale_script_was_computed: bool,

    /// The value of BCP 47 Unicode extension for key `nu` (numbering system)
    pub locale_numbering_system: [u8; 8],
}

/// Result of one tier of [ResTableConfig::is_better_than], `None` means tie
type Tier = Option<bool>;

/// Candidate matching the request beats an unspecified one, which beats a conflicting one
fn exact_tier(mine: u32, theirs: u32, requested: u32) -> Tier {
    if requested == 0 || mine == theirs {
        return None;
    }

    let rank = |v: u32| {
        if v == requested {
            2
        } else if v == 0 {
            1
        } else {
            0
        }
    };

    match rank(mine).cmp(&rank(theirs)) {
        Ordering::Equal => None,
        ord => Some(ord == Ordering::Greater),
    }
}

/// Largest value not exceeding the request wins
fn at_most_tier(mine: u32, theirs: u32, requested: u32) -> Tier {
    if requested == 0 || mine == theirs {
        return None;
    }

    match (mine <= requested, theirs <= requested) {
        (true, true) => Some(mine > theirs),
        (true, false) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Field order of the specificity comparison when no configuration is requested
fn specified_tier(mine: u32, theirs: u32) -> Tier {
    if mine == theirs {
        None
    } else if mine == 0 {
        Some(false)
    } else if theirs == 0 {
        Some(true)
    } else {
        None
    }
}

impl ResTableConfig {
    /// Size of the newest known layout
    pub const SIZE: u32 = 64;

    #[inline(always)]
    pub fn parse(input: &mut &[u8]) -> ModalResult<ResTableConfig> {
        // to keep track of how many bytes was consumed
        let start = input.len();

        let size = le_u32.parse_next(input)?;

        let mut config = ResTableConfig {
            size,
            ..ResTableConfig::default()
        };

        if size >= 8 {
            (config.mcc, config.mnc) = (le_u16, le_u16).parse_next(input)?;
        }
        if size >= 12 {
            config.language = Self::field(input)?;
            config.country = Self::field(input)?;
        }
        if size >= 16 {
            (config.orientation, config.touchscreen, config.density) =
                (u8, u8, le_u16).parse_next(input)?;
        }
        if size >= 20 {
            (
                config.keyboard,
                config.navigation,
                config.input_flags,
                config.grammatical_inflection,
            ) = (u8, u8, u8, u8).parse_next(input)?;
        }
        if size >= 24 {
            (config.screen_width, config.screen_height) = (le_u16, le_u16).parse_next(input)?;
        }
        if size >= 28 {
            (config.sdk_version, config.minor_version) = (le_u16, le_u16).parse_next(input)?;
        }
        if size >= 32 {
            (
                config.screen_layout,
                config.ui_mode,
                config.smallest_screen_width_dp,
            ) = (u8, u8, le_u16).parse_next(input)?;
        }
        if size >= 36 {
            (config.screen_width_dp, config.screen_height_dp) =
                (le_u16, le_u16).parse_next(input)?;
        }
        if size >= 40 {
            config.locale_script = Self::field(input)?;
        }
        if size >= 48 {
            config.locale_variant = Self::field(input)?;
        }
        if size >= 52 {
            // screenConfigPad2 is reserved
            (config.screen_layout2, config.color_mode, _) = (u8, u8, le_u16).parse_next(input)?;
        }
        if size >= 53 {
            config.locale_script_was_computed = u8.parse_next(input)? != 0;
        }
        if size >= 61 {
            config.locale_numbering_system = Self::field(input)?;
        }
        if size > Self::SIZE {
            warn!("got ResTable_config of {} bytes, newer than known layout", size);
        }

        // consume leftovers, including end padding
        let consumed = (start - input.len()) as u32;
        let _ = take(size.saturating_sub(consumed) as usize).parse_next(input)?;

        Ok(config)
    }

    fn field<const N: usize>(input: &mut &[u8]) -> ModalResult<[u8; N]> {
        take(N)
            .map(|raw: &[u8]| {
                let mut out = [0u8; N];
                out.copy_from_slice(raw);
                out
            })
            .parse_next(input)
    }

    /// Packed views matching the unions of the on-disk structure
    #[inline]
    pub fn imsi(&self) -> u32 {
        self.mcc as u32 | (self.mnc as u32) << 16
    }

    #[inline]
    pub fn locale(&self) -> u32 {
        u32::from_le_bytes([
            self.language[0],
            self.language[1],
            self.country[0],
            self.country[1],
        ])
    }

    #[inline]
    pub fn screen_type(&self) -> u32 {
        self.orientation as u32 | (self.touchscreen as u32) << 8 | (self.density as u32) << 16
    }

    #[inline]
    pub fn input(&self) -> u32 {
        u32::from_le_bytes([
            self.keyboard,
            self.navigation,
            self.input_flags,
            self.grammatical_inflection,
        ])
    }

    #[inline]
    pub fn screen_size(&self) -> u32 {
        self.screen_width as u32 | (self.screen_height as u32) << 16
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.sdk_version as u32 | (self.minor_version as u32) << 16
    }

    #[inline]
    pub fn screen_size_dp(&self) -> u32 {
        self.screen_width_dp as u32 | (self.screen_height_dp as u32) << 16
    }

    pub fn language_string(&self) -> String {
        locale::unpack_language(self.language)
    }

    pub fn region_string(&self) -> String {
        locale::unpack_region(self.country)
    }

    /// Returns true if this is the default "any" configuration
    pub fn is_default(&self) -> bool {
        ResTableConfig {
            size: 0,
            ..*self
        } == ResTableConfig::default()
    }

    /// Script explicitly provided for the locale, computed scripts don't count
    fn provided_script(&self) -> Option<[u8; 4]> {
        (self.locale_script[0] != 0 && !self.locale_script_was_computed)
            .then_some(self.locale_script)
    }

    /// Whether this configuration can be used for a device in `requested` configuration
    ///
    /// An axis left unspecified on either side never disqualifies. "At most" axes
    /// (screen sizes, smallest width, sdk version) match while they don't exceed the
    /// request, density always matches since resources can be scaled.
    pub fn matches(&self, requested: &ResTableConfig) -> bool {
        fn conflicts(mine: u32, requested: u32) -> bool {
            mine != 0 && requested != 0 && mine != requested
        }

        fn exceeds(mine: u32, requested: u32) -> bool {
            mine != 0 && requested != 0 && mine > requested
        }

        if conflicts(self.mcc as u32, requested.mcc as u32)
            || conflicts(self.mnc as u32, requested.mnc as u32)
        {
            return false;
        }

        if self.language[0] != 0 && requested.language[0] != 0 {
            if !langs_are_equivalent(self.language, requested.language) {
                return false;
            }

            // if both scripts are known they decide, otherwise regions have to agree
            match (self.provided_script(), requested.locale_script) {
                (Some(mine), theirs) if theirs[0] != 0 => {
                    if mine != theirs {
                        return false;
                    }
                }
                _ => {
                    if self.country[0] != 0
                        && requested.country[0] != 0
                        && self.country != requested.country
                    {
                        return false;
                    }
                }
            }
        }

        let gender = |c: &ResTableConfig| (c.grammatical_inflection & MASK_GRAMMATICAL_GENDER) as u32;
        if conflicts(gender(self), gender(requested)) {
            return false;
        }

        let layout = |c: &ResTableConfig, mask: u8| (c.screen_layout & mask) as u32;
        if conflicts(layout(self, MASK_LAYOUTDIR), layout(requested, MASK_LAYOUTDIR))
            || exceeds(layout(self, MASK_SCREENSIZE), layout(requested, MASK_SCREENSIZE))
            || conflicts(layout(self, MASK_SCREENLONG), layout(requested, MASK_SCREENLONG))
        {
            return false;
        }

        let ui_mode = |c: &ResTableConfig, mask: u8| (c.ui_mode & mask) as u32;
        if conflicts(ui_mode(self, MASK_UI_MODE_TYPE), ui_mode(requested, MASK_UI_MODE_TYPE))
            || conflicts(ui_mode(self, MASK_UI_MODE_NIGHT), ui_mode(requested, MASK_UI_MODE_NIGHT))
        {
            return false;
        }

        if exceeds(
            self.smallest_screen_width_dp as u32,
            requested.smallest_screen_width_dp as u32,
        ) {
            return false;
        }

        let round = |c: &ResTableConfig| (c.screen_layout2 & MASK_SCREENROUND) as u32;
        let color = |c: &ResTableConfig, mask: u8| (c.color_mode & mask) as u32;
        if conflicts(round(self), round(requested))
            || conflicts(color(self, MASK_HDR), color(requested, MASK_HDR))
            || conflicts(
                color(self, MASK_WIDE_COLOR_GAMUT),
                color(requested, MASK_WIDE_COLOR_GAMUT),
            )
        {
            return false;
        }

        if exceeds(self.screen_width_dp as u32, requested.screen_width_dp as u32)
            || exceeds(self.screen_height_dp as u32, requested.screen_height_dp as u32)
        {
            return false;
        }

        if conflicts(self.orientation as u32, requested.orientation as u32)
            || conflicts(self.touchscreen as u32, requested.touchscreen as u32)
        {
            return false;
        }

        let keys_hidden = self.input_flags & MASK_KEYSHIDDEN;
        let requested_keys_hidden = requested.input_flags & MASK_KEYSHIDDEN;
        // a "keys exposed" resource is fine for a soft keyboard
        if conflicts(keys_hidden as u32, requested_keys_hidden as u32)
            && !(keys_hidden == KEYSHIDDEN_NO && requested_keys_hidden == KEYSHIDDEN_SOFT)
        {
            return false;
        }

        let nav_hidden = |c: &ResTableConfig| (c.input_flags & MASK_NAVHIDDEN) as u32;
        if conflicts(nav_hidden(self), nav_hidden(requested))
            || conflicts(self.keyboard as u32, requested.keyboard as u32)
            || conflicts(self.navigation as u32, requested.navigation as u32)
        {
            return false;
        }

        if exceeds(self.screen_width as u32, requested.screen_width as u32)
            || exceeds(self.screen_height as u32, requested.screen_height as u32)
        {
            return false;
        }

        if exceeds(self.sdk_version as u32, requested.sdk_version as u32)
            || conflicts(self.minor_version as u32, requested.minor_version as u32)
        {
            return false;
        }

        true
    }

    /// Whether this configuration is a better match for `requested` than `other`
    ///
    /// Both configurations are expected to match `requested`. Axes are compared in
    /// order of importance and the first one that tells them apart decides. Without
    /// a requested configuration the more specific configuration wins.
    pub fn is_better_than(&self, other: &ResTableConfig, requested: Option<&ResTableConfig>) -> bool {
        let Some(requested) = requested else {
            return self.is_more_specific_than(other);
        };

        let tiers: [&dyn Fn() -> Tier; 14] = [
            &|| exact_tier(self.mcc as u32, other.mcc as u32, requested.mcc as u32),
            &|| exact_tier(self.mnc as u32, other.mnc as u32, requested.mnc as u32),
            &|| self.locale_tier(other, requested),
            &|| {
                let gender = |c: &ResTableConfig| (c.grammatical_inflection & MASK_GRAMMATICAL_GENDER) as u32;
                exact_tier(gender(self), gender(other), gender(requested))
            },
            &|| {
                let dir = |c: &ResTableConfig| (c.screen_layout & MASK_LAYOUTDIR) as u32;
                exact_tier(dir(self), dir(other), dir(requested))
            },
            &|| {
                at_most_tier(
                    self.smallest_screen_width_dp as u32,
                    other.smallest_screen_width_dp as u32,
                    requested.smallest_screen_width_dp as u32,
                )
            },
            &|| self.screen_size_tier(other, requested),
            &|| {
                Self::size_delta_tier(
                    (self.screen_width_dp, self.screen_height_dp),
                    (other.screen_width_dp, other.screen_height_dp),
                    (requested.screen_width_dp, requested.screen_height_dp),
                )
            },
            &|| self.screen_shape_tier(other, requested),
            &|| exact_tier(self.orientation as u32, other.orientation as u32, requested.orientation as u32),
            &|| {
                let ui = |c: &ResTableConfig, mask: u8| (c.ui_mode & mask) as u32;
                exact_tier(
                    ui(self, MASK_UI_MODE_TYPE),
                    ui(other, MASK_UI_MODE_TYPE),
                    ui(requested, MASK_UI_MODE_TYPE),
                )
                .or_else(|| {
                    exact_tier(
                        ui(self, MASK_UI_MODE_NIGHT),
                        ui(other, MASK_UI_MODE_NIGHT),
                        ui(requested, MASK_UI_MODE_NIGHT),
                    )
                })
            },
            &|| exact_tier(self.touchscreen as u32, other.touchscreen as u32, requested.touchscreen as u32),
            &|| self.density_tier(other, requested),
            &|| self.input_tier(other, requested),
        ];

        for tier in tiers {
            if let Some(better) = tier() {
                return better;
            }
        }

        if let Some(better) = Self::size_delta_tier(
            (self.screen_width, self.screen_height),
            (other.screen_width, other.screen_height),
            (requested.screen_width, requested.screen_height),
        ) {
            return better;
        }

        at_most_tier(
            self.sdk_version as u32,
            other.sdk_version as u32,
            requested.sdk_version as u32,
        )
        .or_else(|| {
            exact_tier(
                self.minor_version as u32,
                other.minor_version as u32,
                requested.minor_version as u32,
            )
        })
        .unwrap_or(false)
    }

    fn locale_tier(&self, other: &ResTableConfig, requested: &ResTableConfig) -> Tier {
        if requested.language[0] == 0 {
            // no language requested, English is the conventional fallback
            if self.language != other.language {
                if self.language == ENGLISH {
                    return Some(true);
                }
                if other.language == ENGLISH {
                    return Some(false);
                }
            }
            return None;
        }

        let rank = |c: &ResTableConfig| {
            if c.language[0] == 0 {
                1
            } else if langs_are_equivalent(c.language, requested.language) {
                2
            } else {
                0
            }
        };

        let (mine, theirs) = (rank(self), rank(other));
        if mine == 0 || theirs == 0 {
            return match mine.cmp(&theirs) {
                Ordering::Equal => None,
                ord => Some(ord == Ordering::Greater),
            };
        }

        if self.is_locale_better_than(other, requested) {
            Some(true)
        } else if other.is_locale_better_than(self, requested) {
            Some(false)
        } else {
            None
        }
    }

    /// Both locales are known to be compatible with the requested one here
    fn is_locale_better_than(&self, other: &ResTableConfig, requested: &ResTableConfig) -> bool {
        if requested.locale() == 0 || (self.locale() == 0 && other.locale() == 0) {
            return false;
        }

        if !langs_are_equivalent(self.language, other.language) {
            // one of them has no language. Resources without a language are where
            // US English traditionally lives, so they win over other English regions.
            if requested.language == ENGLISH {
                if requested.country == UNITED_STATES {
                    if self.language[0] != 0 {
                        return self.country[0] == 0 || self.country == UNITED_STATES;
                    }
                    return !(other.country[0] == 0 || other.country == UNITED_STATES);
                } else if is_close_to_us_english(requested.country) {
                    if self.language[0] != 0 {
                        return is_close_to_us_english(self.country);
                    }
                    return !is_close_to_us_english(other.country);
                }
            }
            return self.language[0] != 0;
        }

        let region = compare_regions(self.country, other.country, requested.country);
        if region != 0 {
            return region > 0;
        }

        let variant = self.locale_variant == requested.locale_variant;
        let other_variant = other.locale_variant == requested.locale_variant;
        if variant != other_variant {
            return variant;
        }

        let numbering = self.locale_numbering_system == requested.locale_numbering_system;
        let other_numbering = other.locale_numbering_system == requested.locale_numbering_system;
        if numbering != other_numbering {
            return numbering;
        }

        // Tagalog and Filipino are equivalent, but the identical one is better
        self.language == requested.language && other.language != requested.language
    }

    fn screen_size_tier(&self, other: &ResTableConfig, requested: &ResTableConfig) -> Tier {
        let requested_size = requested.screen_layout & MASK_SCREENSIZE;
        let mine = self.screen_layout & MASK_SCREENSIZE;
        let theirs = other.screen_layout & MASK_SCREENSIZE;

        if requested_size == 0 || mine == theirs {
            return None;
        }

        match (mine > requested_size, theirs > requested_size) {
            (true, true) => return None,
            (true, false) => return Some(false),
            (false, true) => return Some(true),
            (false, false) => {}
        }

        // undefined is considered equivalent to normal, but only if the
        // requested size is at least normal
        let fix = |size: u8| {
            if size == 0 && requested_size >= SCREENSIZE_NORMAL {
                SCREENSIZE_NORMAL
            } else {
                size
            }
        };

        let (fixed_mine, fixed_theirs) = (fix(mine), fix(theirs));
        if fixed_mine == fixed_theirs {
            return Some(mine != 0);
        }

        Some(fixed_mine > fixed_theirs)
    }

    /// Closest size not exceeding the request, by summed difference of both dimensions
    fn size_delta_tier(mine: (u16, u16), theirs: (u16, u16), requested: (u16, u16)) -> Tier {
        if (requested.0 == 0 && requested.1 == 0) || mine == theirs {
            return None;
        }

        let over = |size: (u16, u16)| {
            (requested.0 != 0 && size.0 > requested.0) || (requested.1 != 0 && size.1 > requested.1)
        };

        match (over(mine), over(theirs)) {
            (true, true) => return None,
            (true, false) => return Some(false),
            (false, true) => return Some(true),
            (false, false) => {}
        }

        // unspecified dimensions end up with a large delta, specified ones are preferred
        let delta = |size: (u16, u16)| {
            let mut delta = 0u32;
            if requested.0 != 0 {
                delta += (requested.0 - size.0) as u32;
            }
            if requested.1 != 0 {
                delta += (requested.1 - size.1) as u32;
            }
            delta
        };

        let (mine, theirs) = (delta(mine), delta(theirs));
        (mine != theirs).then_some(mine < theirs)
    }

    fn screen_shape_tier(&self, other: &ResTableConfig, requested: &ResTableConfig) -> Tier {
        let long = |c: &ResTableConfig| (c.screen_layout & MASK_SCREENLONG) as u32;
        let round = |c: &ResTableConfig| (c.screen_layout2 & MASK_SCREENROUND) as u32;
        let color = |c: &ResTableConfig, mask: u8| (c.color_mode & mask) as u32;

        exact_tier(long(self), long(other), long(requested))
            .or_else(|| exact_tier(round(self), round(other), round(requested)))
            .or_else(|| {
                exact_tier(
                    color(self, MASK_WIDE_COLOR_GAMUT),
                    color(other, MASK_WIDE_COLOR_GAMUT),
                    color(requested, MASK_WIDE_COLOR_GAMUT),
                )
            })
            .or_else(|| {
                exact_tier(
                    color(self, MASK_HDR),
                    color(other, MASK_HDR),
                    color(requested, MASK_HDR),
                )
            })
    }

    /// Exact density wins, then the nearest one, the higher of two equidistant ones
    ///
    /// Unspecified densities (including the requested one) count as medium.
    fn density_tier(&self, other: &ResTableConfig, requested: &ResTableConfig) -> Tier {
        if self.density == other.density {
            return None;
        }
        if self.density == DENSITY_ANY {
            return Some(true);
        }
        if other.density == DENSITY_ANY {
            return Some(false);
        }

        let normalize = |density: u16| {
            if density == DENSITY_DEFAULT {
                DENSITY_MEDIUM
            } else {
                density
            }
        };

        let (mine, theirs) = (normalize(self.density), normalize(other.density));
        if mine == theirs {
            return None;
        }

        let requested = match requested.density {
            DENSITY_DEFAULT | DENSITY_ANY => DENSITY_MEDIUM,
            density => density,
        };

        if mine == requested {
            return Some(true);
        }
        if theirs == requested {
            return Some(false);
        }

        let (my_distance, their_distance) = (mine.abs_diff(requested), theirs.abs_diff(requested));
        if my_distance != their_distance {
            return Some(my_distance < their_distance);
        }

        Some(mine > theirs)
    }

    fn input_tier(&self, other: &ResTableConfig, requested: &ResTableConfig) -> Tier {
        let keys_hidden = self.input_flags & MASK_KEYSHIDDEN;
        let other_keys_hidden = other.input_flags & MASK_KEYSHIDDEN;
        let requested_keys_hidden = requested.input_flags & MASK_KEYSHIDDEN;

        if keys_hidden != other_keys_hidden && requested_keys_hidden != 0 {
            // exact > compatible ("exposed" for "soft") > unspecified > conflicting
            let rank = |v: u8| {
                if v == requested_keys_hidden {
                    3
                } else if v == KEYSHIDDEN_NO && requested_keys_hidden == KEYSHIDDEN_SOFT {
                    2
                } else if v == 0 {
                    1
                } else {
                    0
                }
            };

            match rank(keys_hidden).cmp(&rank(other_keys_hidden)) {
                Ordering::Equal => {}
                ord => return Some(ord == Ordering::Greater),
            }
        }

        let nav_hidden = |c: &ResTableConfig| (c.input_flags & MASK_NAVHIDDEN) as u32;

        exact_tier(self.keyboard as u32, other.keyboard as u32, requested.keyboard as u32)
            .or_else(|| exact_tier(nav_hidden(self), nav_hidden(other), nav_hidden(requested)))
            .or_else(|| {
                exact_tier(
                    self.navigation as u32,
                    other.navigation as u32,
                    requested.navigation as u32,
                )
            })
    }

    /// Specified beats unspecified, in order of importance of the axes
    pub fn is_more_specific_than(&self, other: &ResTableConfig) -> bool {
        let layout = |c: &ResTableConfig, mask: u8| (c.screen_layout & mask) as u32;
        let ui = |c: &ResTableConfig, mask: u8| (c.ui_mode & mask) as u32;
        let color = |c: &ResTableConfig, mask: u8| (c.color_mode & mask) as u32;
        let input = |c: &ResTableConfig, mask: u8| (c.input_flags & mask) as u32;

        let tiers: [&dyn Fn() -> Tier; 22] = [
            &|| specified_tier(self.mcc as u32, other.mcc as u32),
            &|| specified_tier(self.mnc as u32, other.mnc as u32),
            &|| match self.locale_specificity(other) {
                0 => None,
                diff => Some(diff > 0),
            },
            &|| specified_tier(layout(self, MASK_LAYOUTDIR), layout(other, MASK_LAYOUTDIR)),
            &|| {
                specified_tier(
                    self.smallest_screen_width_dp as u32,
                    other.smallest_screen_width_dp as u32,
                )
            },
            &|| specified_tier(self.screen_width_dp as u32, other.screen_width_dp as u32),
            &|| specified_tier(self.screen_height_dp as u32, other.screen_height_dp as u32),
            &|| specified_tier(layout(self, MASK_SCREENSIZE), layout(other, MASK_SCREENSIZE)),
            &|| specified_tier(layout(self, MASK_SCREENLONG), layout(other, MASK_SCREENLONG)),
            &|| {
                specified_tier(
                    (self.screen_layout2 & MASK_SCREENROUND) as u32,
                    (other.screen_layout2 & MASK_SCREENROUND) as u32,
                )
            },
            &|| specified_tier(color(self, MASK_HDR), color(other, MASK_HDR)),
            &|| {
                specified_tier(
                    color(self, MASK_WIDE_COLOR_GAMUT),
                    color(other, MASK_WIDE_COLOR_GAMUT),
                )
            },
            &|| specified_tier(self.orientation as u32, other.orientation as u32),
            &|| specified_tier(ui(self, MASK_UI_MODE_TYPE), ui(other, MASK_UI_MODE_TYPE)),
            &|| specified_tier(ui(self, MASK_UI_MODE_NIGHT), ui(other, MASK_UI_MODE_NIGHT)),
            // density is never more specific, the default equals medium
            &|| specified_tier(self.touchscreen as u32, other.touchscreen as u32),
            &|| specified_tier(input(self, MASK_KEYSHIDDEN), input(other, MASK_KEYSHIDDEN)),
            &|| specified_tier(input(self, MASK_NAVHIDDEN), input(other, MASK_NAVHIDDEN)),
            &|| specified_tier(self.keyboard as u32, other.keyboard as u32),
            &|| specified_tier(self.navigation as u32, other.navigation as u32),
            &|| {
                specified_tier(self.screen_width as u32, other.screen_width as u32)
                    .or_else(|| specified_tier(self.screen_height as u32, other.screen_height as u32))
            },
            &|| {
                specified_tier(self.sdk_version as u32, other.sdk_version as u32)
                    .or_else(|| specified_tier(self.minor_version as u32, other.minor_version as u32))
            },
        ];

        tiers.iter().find_map(|tier| tier()).unwrap_or(false)
    }

    /// Variants count more than scripts, which count more than numbering systems
    fn locale_importance(&self) -> i32 {
        (if self.locale_variant[0] != 0 { 4 } else { 0 })
            + (if self.provided_script().is_some() { 2 } else { 0 })
            + (if self.locale_numbering_system[0] != 0 { 1 } else { 0 })
    }

    fn locale_specificity(&self, other: &ResTableConfig) -> i32 {
        if self.locale() != 0 || other.locale() != 0 {
            if self.language[0] != other.language[0] {
                if self.language[0] == 0 {
                    return -1;
                }
                if other.language[0] == 0 {
                    return 1;
                }
            }
            if self.country[0] != other.country[0] {
                if self.country[0] == 0 {
                    return -1;
                }
                if other.country[0] == 0 {
                    return 1;
                }
            }
        }

        self.locale_importance() - other.locale_importance()
    }

    fn compare_locales(&self, other: &ResTableConfig) -> Ordering {
        if self.locale() != other.locale() {
            return self.locale().cmp(&other.locale());
        }

        let script = |c: &ResTableConfig| c.provided_script().unwrap_or_default();

        script(self)
            .cmp(&script(other))
            .then_with(|| self.locale_variant.cmp(&other.locale_variant))
            .then_with(|| {
                self.locale_numbering_system
                    .cmp(&other.locale_numbering_system)
            })
    }

    /// Total order over configurations, stable but without any meaning beyond equality
    pub fn compare(&self, other: &ResTableConfig) -> Ordering {
        self.imsi()
            .cmp(&other.imsi())
            .then_with(|| self.compare_locales(other))
            .then_with(|| self.screen_type().cmp(&other.screen_type()))
            .then_with(|| self.input().cmp(&other.input()))
            .then_with(|| self.screen_size().cmp(&other.screen_size()))
            .then_with(|| self.version().cmp(&other.version()))
            .then_with(|| self.screen_layout.cmp(&other.screen_layout))
            .then_with(|| self.screen_layout2.cmp(&other.screen_layout2))
            .then_with(|| self.color_mode.cmp(&other.color_mode))
            .then_with(|| self.ui_mode.cmp(&other.ui_mode))
            .then_with(|| {
                self.smallest_screen_width_dp
                    .cmp(&other.smallest_screen_width_dp)
            })
            .then_with(|| self.screen_size_dp().cmp(&other.screen_size_dp()))
    }

    /// Axes on which the two configurations differ
    pub fn diff(&self, other: &ResTableConfig) -> ResTableConfigFlags {
        let mut diffs = ResTableConfigFlags::empty();

        let mut set = |differs: bool, flag: ResTableConfigFlags| {
            if differs {
                diffs |= flag;
            }
        };

        set(self.mcc != other.mcc, ResTableConfigFlags::CONFIG_MCC);
        set(self.mnc != other.mnc, ResTableConfigFlags::CONFIG_MNC);
        set(self.orientation != other.orientation, ResTableConfigFlags::CONFIG_ORIENTATION);
        set(self.density != other.density, ResTableConfigFlags::CONFIG_DENSITY);
        set(self.touchscreen != other.touchscreen, ResTableConfigFlags::CONFIG_TOUCHSCREEN);
        set(
            (self.input_flags ^ other.input_flags) & (MASK_KEYSHIDDEN | MASK_NAVHIDDEN) != 0,
            ResTableConfigFlags::CONFIG_KEYBOARD_HIDDEN,
        );
        set(self.keyboard != other.keyboard, ResTableConfigFlags::CONFIG_KEYBOARD);
        set(self.navigation != other.navigation, ResTableConfigFlags::CONFIG_NAVIGATION);
        set(
            self.screen_size() != other.screen_size()
                || self.screen_size_dp() != other.screen_size_dp(),
            ResTableConfigFlags::CONFIG_SCREEN_SIZE,
        );
        set(self.version() != other.version(), ResTableConfigFlags::CONFIG_VERSION);
        set(
            (self.screen_layout ^ other.screen_layout) & MASK_LAYOUTDIR != 0,
            ResTableConfigFlags::CONFIG_LAYOUTDIR,
        );
        set(
            (self.screen_layout ^ other.screen_layout) & !MASK_LAYOUTDIR != 0,
            ResTableConfigFlags::CONFIG_SCREEN_LAYOUT,
        );
        set(
            (self.screen_layout2 ^ other.screen_layout2) & MASK_SCREENROUND != 0,
            ResTableConfigFlags::CONFIG_SCREEN_ROUND,
        );
        set(
            (self.color_mode ^ other.color_mode) & (MASK_WIDE_COLOR_GAMUT | MASK_HDR) != 0,
            ResTableConfigFlags::CONFIG_COLOR_MODE,
        );
        set(self.ui_mode != other.ui_mode, ResTableConfigFlags::CONFIG_UI_MODE);
        set(
            self.smallest_screen_width_dp != other.smallest_screen_width_dp,
            ResTableConfigFlags::CONFIG_SMALLEST_SCREEN_SIZE,
        );
        set(
            (self.grammatical_inflection ^ other.grammatical_inflection) & MASK_GRAMMATICAL_GENDER
                != 0,
            ResTableConfigFlags::CONFIG_GRAMMATICAL_GENDER,
        );
        set(
            self.compare_locales(other) != Ordering::Equal,
            ResTableConfigFlags::CONFIG_LOCALE,
        );

        diffs
    }

    /// Locale part of the qualifier string, `b+` form when plain form can't express it
    fn write_locale(&self, out: &mut Vec<String>) {
        if self.language[0] == 0 {
            return;
        }

        let language = self.language_string();
        let region = self.region_string();
        let script = self.provided_script().map(|s| ascii_field(&s)).unwrap_or_default();
        let variant = ascii_field(&self.locale_variant);

        if script.is_empty() && variant.is_empty() && language.len() == 2 && region.len() != 3 {
            out.push(language);
            if !region.is_empty() {
                out.push(format!("r{}", region));
            }
            return;
        }

        let mut tag = format!("b+{}", language);
        for part in [script, region, variant] {
            if !part.is_empty() {
                let _ = write!(tag, "+{}", part);
            }
        }
        out.push(tag);
    }
}

/// Push the keyword of `value` in `table`, unknown values as hex, nothing for 0
fn push_named(out: &mut Vec<String>, table: &phf::Map<&'static str, u16>, value: u16) {
    if value == 0 {
        return;
    }
    match name_of(table, value) {
        Some(name) => out.push(name.to_owned()),
        None => out.push(format!("0x{:x}", value)),
    }
}

impl Display for ResTableConfig {
    /// Canonical qualifier string, `default` for the empty configuration
    ///
    /// [Source Code](https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/libs/androidfw/ResourceTypes.cpp;l=3368)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return f.write_str("default");
        }

        let mut parts: Vec<String> = Vec::new();

        let mut prefix: Vec<String> = Vec::new();
        if self.mcc != 0 {
            prefix.push(format!("mcc{}", self.mcc));
        }
        if self.mnc != 0 {
            prefix.push(if self.mnc == MNC_ZERO {
                "mnc00".to_owned()
            } else {
                format!("mnc{}", self.mnc)
            });
        }
        self.write_locale(&mut prefix);

        push_named(
            &mut parts,
            &qualifiers::GRAMMATICAL_GENDERS,
            (self.grammatical_inflection & MASK_GRAMMATICAL_GENDER) as u16,
        );
        push_named(&mut parts, &qualifiers::LAYOUT_DIRS, (self.screen_layout & MASK_LAYOUTDIR) as u16);

        let mut dims: Vec<String> = Vec::new();
        if self.smallest_screen_width_dp != 0 {
            dims.push(format!("sw{}dp", self.smallest_screen_width_dp));
        }
        if self.screen_width_dp != 0 {
            dims.push(format!("w{}dp", self.screen_width_dp));
        }
        if self.screen_height_dp != 0 {
            dims.push(format!("h{}dp", self.screen_height_dp));
        }

        let mut rest: Vec<String> = Vec::new();

        push_named(&mut rest, &qualifiers::SCREEN_SIZES, (self.screen_layout & MASK_SCREENSIZE) as u16);
        push_named(&mut rest, &qualifiers::SCREEN_LONG, (self.screen_layout & MASK_SCREENLONG) as u16);
        push_named(&mut rest, &qualifiers::SCREEN_ROUND, (self.screen_layout2 & MASK_SCREENROUND) as u16);
        push_named(
            &mut rest,
            &qualifiers::WIDE_COLOR_GAMUT,
            (self.color_mode & MASK_WIDE_COLOR_GAMUT) as u16,
        );
        push_named(&mut rest, &qualifiers::HDR, (self.color_mode & MASK_HDR) as u16);
        push_named(&mut rest, &qualifiers::ORIENTATIONS, self.orientation as u16);
        push_named(&mut rest, &qualifiers::UI_MODE_TYPES, (self.ui_mode & MASK_UI_MODE_TYPE) as u16);
        push_named(&mut rest, &qualifiers::UI_MODE_NIGHT, (self.ui_mode & MASK_UI_MODE_NIGHT) as u16);
        if self.density != 0 {
            match name_of(&qualifiers::DENSITIES, self.density) {
                Some(name) => rest.push(name.to_owned()),
                None => rest.push(format!("{}dpi", self.density)),
            }
        }
        push_named(&mut rest, &qualifiers::TOUCHSCREENS, self.touchscreen as u16);
        push_named(&mut rest, &qualifiers::KEYS_HIDDEN, (self.input_flags & MASK_KEYSHIDDEN) as u16);
        push_named(&mut rest, &qualifiers::KEYBOARDS, self.keyboard as u16);
        push_named(&mut rest, &qualifiers::NAV_HIDDEN, (self.input_flags & MASK_NAVHIDDEN) as u16);
        push_named(&mut rest, &qualifiers::NAVIGATIONS, self.navigation as u16);
        if self.screen_width != 0 || self.screen_height != 0 {
            rest.push(format!("{}x{}", self.screen_width, self.screen_height));
        }
        if self.sdk_version != 0 {
            let mut version = format!("v{}", self.sdk_version);
            if self.minor_version != 0 {
                let _ = write!(version, ".{}", self.minor_version);
            }
            rest.push(version);
        }

        let joined = prefix
            .into_iter()
            .chain(parts)
            .chain(dims)
            .chain(rest)
            .collect::<Vec<_>>()
            .join("-");

        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(f: impl FnOnce(&mut ResTableConfig)) -> ResTableConfig {
        let mut c = ResTableConfig::default();
        f(&mut c);
        c
    }

    fn encode(config: &ResTableConfig, size: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&config.mcc.to_le_bytes());
        out.extend_from_slice(&config.mnc.to_le_bytes());
        out.extend_from_slice(&config.language);
        out.extend_from_slice(&config.country);
        out.push(config.orientation);
        out.push(config.touchscreen);
        out.extend_from_slice(&config.density.to_le_bytes());
        out.extend_from_slice(&[config.keyboard, config.navigation, config.input_flags, 0]);
        out.extend_from_slice(&config.screen_width.to_le_bytes());
        out.extend_from_slice(&config.screen_height.to_le_bytes());
        out.extend_from_slice(&config.sdk_version.to_le_bytes());
        out.extend_from_slice(&config.minor_version.to_le_bytes());
        out.push(config.screen_layout);
        out.push(config.ui_mode);
        out.extend_from_slice(&config.smallest_screen_width_dp.to_le_bytes());
        out.extend_from_slice(&config.screen_width_dp.to_le_bytes());
        out.extend_from_slice(&config.screen_height_dp.to_le_bytes());
        out.resize(size as usize, 0);
        out
    }

    #[test]
    fn parse_short_config() {
        let expected = config(|c| {
            c.mcc = 310;
            c.language = *b"en";
            c.country = *b"US";
            c.density = DENSITY_HIGH;
        });
        let mut raw = encode(&expected, 28);
        raw.extend_from_slice(&[0xAA, 0xBB]);
        let mut input = raw.as_slice();

        let parsed = ResTableConfig::parse(&mut input).unwrap();
        assert_eq!(parsed.size, 28);
        assert_eq!(parsed.mcc, 310);
        assert_eq!(parsed.language, *b"en");
        assert_eq!(parsed.density, DENSITY_HIGH);
        assert_eq!(input, &[0xAA, 0xBB]);
    }

    #[test]
    fn parse_full_config_consumes_padding() {
        let expected = config(|c| {
            c.smallest_screen_width_dp = 600;
            c.sdk_version = 21;
        });
        let raw = encode(&expected, 64);
        let mut input = raw.as_slice();

        let parsed = ResTableConfig::parse(&mut input).unwrap();
        assert_eq!(parsed.smallest_screen_width_dp, 600);
        assert_eq!(parsed.sdk_version, 21);
        assert!(input.is_empty());
    }

    #[test]
    fn parse_truncated_config() {
        let raw = encode(&ResTableConfig::default(), 64);
        let mut input = &raw[..40];
        assert!(ResTableConfig::parse(&mut input).is_err());
    }

    #[test]
    fn match_unspecified_request_never_disqualifies() {
        let candidate = config(|c| {
            c.mcc = 310;
            c.language = *b"fr";
            c.sdk_version = 26;
        });
        assert!(candidate.matches(&ResTableConfig::default()));
    }

    #[test]
    fn match_conflicting_axes() {
        let requested = config(|c| {
            c.mcc = 310;
            c.language = *b"en";
            c.country = *b"US";
            c.sdk_version = 21;
            c.smallest_screen_width_dp = 360;
        });

        assert!(config(|c| c.mcc = 310).matches(&requested));
        assert!(!config(|c| c.mcc = 311).matches(&requested));
        assert!(!config(|c| c.language = *b"de").matches(&requested));
        assert!(!config(|c| {
            c.language = *b"en";
            c.country = *b"GB";
        })
        .matches(&requested));
        assert!(config(|c| c.language = *b"en").matches(&requested));
        assert!(config(|c| c.sdk_version = 19).matches(&requested));
        assert!(!config(|c| c.sdk_version = 26).matches(&requested));
        assert!(config(|c| c.smallest_screen_width_dp = 320).matches(&requested));
        assert!(!config(|c| c.smallest_screen_width_dp = 600).matches(&requested));
        assert!(config(|c| c.density = DENSITY_XXHIGH).matches(&requested));
    }

    #[test]
    fn match_keys_exposed_for_soft_keyboard() {
        let requested = config(|c| c.input_flags = KEYSHIDDEN_SOFT);
        assert!(config(|c| c.input_flags = KEYSHIDDEN_NO).matches(&requested));
        assert!(!config(|c| c.input_flags = 0x02).matches(&requested));
    }

    #[test]
    fn better_mcc() {
        let requested = config(|c| c.mcc = 310);
        let specified = config(|c| c.mcc = 310);
        let unspecified = ResTableConfig::default();

        assert!(specified.is_better_than(&unspecified, Some(&requested)));
        assert!(!unspecified.is_better_than(&specified, Some(&requested)));
    }

    #[test]
    fn better_english_without_requested_language() {
        let requested = ResTableConfig::default();
        let english = config(|c| c.language = *b"en");
        let spanish = config(|c| c.language = *b"es");

        assert!(english.is_better_than(&spanish, Some(&requested)));
        assert!(!spanish.is_better_than(&english, Some(&requested)));
    }

    #[test]
    fn better_locale_for_us_english() {
        let requested = config(|c| {
            c.language = *b"en";
            c.country = *b"US";
        });
        let no_locale = ResTableConfig::default();
        let british = config(|c| {
            c.language = *b"en";
            c.country = *b"GB";
        });
        let english = config(|c| c.language = *b"en");
        let american = config(|c| {
            c.language = *b"en";
            c.country = *b"US";
        });

        assert!(no_locale.is_better_than(&british, Some(&requested)));
        assert!(english.is_better_than(&no_locale, Some(&requested)));
        assert!(american.is_better_than(&english, Some(&requested)));
    }

    #[test]
    fn better_region_for_other_locales() {
        let requested = config(|c| {
            c.language = *b"fr";
            c.country = *b"CA";
        });
        let french = config(|c| c.language = *b"fr");
        let canadian = config(|c| {
            c.language = *b"fr";
            c.country = *b"CA";
        });

        assert!(canadian.is_better_than(&french, Some(&requested)));
        assert!(french.is_better_than(&ResTableConfig::default(), Some(&requested)));
    }

    #[test]
    fn better_density() {
        let requested = config(|c| c.density = DENSITY_HIGH);
        let mdpi = config(|c| c.density = DENSITY_MEDIUM);
        let hdpi = config(|c| c.density = DENSITY_HIGH);
        let xhdpi = config(|c| c.density = DENSITY_XHIGH);
        let anydpi = config(|c| c.density = DENSITY_ANY);

        assert!(hdpi.is_better_than(&xhdpi, Some(&requested)));
        assert!(anydpi.is_better_than(&hdpi, Some(&requested)));

        // 160 and 320 are both 80 away from 240, the higher one wins
        assert!(xhdpi.is_better_than(&mdpi, Some(&requested)));
        assert!(!mdpi.is_better_than(&xhdpi, Some(&requested)));

        let requested = config(|c| c.density = 200);
        assert!(mdpi.is_better_than(&xhdpi, Some(&requested)));
    }

    #[test]
    fn better_sdk_version() {
        let requested = config(|c| c.sdk_version = 23);
        let v21 = config(|c| c.sdk_version = 21);
        let v19 = config(|c| c.sdk_version = 19);
        let v26 = config(|c| c.sdk_version = 26);

        assert!(v21.is_better_than(&v19, Some(&requested)));
        assert!(v19.is_better_than(&v26, Some(&requested)));
        assert!(v19.is_better_than(&ResTableConfig::default(), Some(&requested)));
    }

    #[test]
    fn better_smallest_width_before_orientation() {
        let requested = config(|c| {
            c.smallest_screen_width_dp = 600;
            c.orientation = ORIENTATION_LAND;
        });
        let sw600 = config(|c| c.smallest_screen_width_dp = 600);
        let land = config(|c| c.orientation = ORIENTATION_LAND);

        assert!(sw600.is_better_than(&land, Some(&requested)));
        assert!(!land.is_better_than(&sw600, Some(&requested)));
    }

    #[test]
    fn better_is_irreflexive() {
        let requested = config(|c| {
            c.mcc = 310;
            c.language = *b"en";
            c.density = DENSITY_HIGH;
            c.sdk_version = 28;
        });
        let candidates = [
            ResTableConfig::default(),
            config(|c| c.mcc = 310),
            config(|c| c.language = *b"en"),
            config(|c| c.density = DENSITY_XHIGH),
            config(|c| c.sdk_version = 21),
        ];

        for candidate in &candidates {
            assert!(!candidate.is_better_than(candidate, Some(&requested)));
            assert!(!candidate.is_better_than(candidate, None));
        }
    }

    #[test]
    fn better_is_asymmetric_and_transitive() {
        let requested = config(|c| {
            c.language = *b"en";
            c.country = *b"US";
            c.orientation = ORIENTATION_PORT;
            c.density = DENSITY_XHIGH;
            c.sdk_version = 30;
            c.screen_width_dp = 411;
            c.screen_height_dp = 731;
        });
        let candidates = [
            ResTableConfig::default(),
            config(|c| c.language = *b"en"),
            config(|c| {
                c.language = *b"en";
                c.country = *b"US";
            }),
            config(|c| c.orientation = ORIENTATION_PORT),
            config(|c| c.density = DENSITY_HIGH),
            config(|c| c.density = DENSITY_XXHIGH),
            config(|c| c.sdk_version = 21),
            config(|c| c.screen_width_dp = 400),
            config(|c| {
                c.screen_width_dp = 400;
                c.screen_height_dp = 700;
            }),
        ];

        let better = |a: &ResTableConfig, b: &ResTableConfig| a.is_better_than(b, Some(&requested));
        for a in &candidates {
            for b in &candidates {
                assert!(!(better(a, b) && better(b, a)), "{} <> {}", a, b);
                for c in &candidates {
                    if better(a, b) && better(b, c) {
                        assert!(better(a, c), "{} > {} > {}", a, b, c);
                    }
                }
            }
        }
    }

    #[test]
    fn more_specific_without_request() {
        let specified = config(|c| c.orientation = ORIENTATION_PORT);
        assert!(specified.is_more_specific_than(&ResTableConfig::default()));
        assert!(!ResTableConfig::default().is_more_specific_than(&specified));
        assert!(specified.is_better_than(&ResTableConfig::default(), None));
    }

    #[test]
    fn compare_and_diff() {
        let a = config(|c| c.density = DENSITY_HIGH);
        let b = config(|c| {
            c.density = DENSITY_HIGH;
            c.sdk_version = 21;
        });

        assert_eq!(a.compare(&a), Ordering::Equal);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(a.diff(&b), ResTableConfigFlags::CONFIG_VERSION);
        assert_eq!(
            a.diff(&ResTableConfig::default()),
            ResTableConfigFlags::CONFIG_DENSITY
        );
    }

    #[test]
    fn display() {
        assert_eq!(ResTableConfig::default().to_string(), "default");

        let c = config(|c| {
            c.mcc = 310;
            c.mnc = MNC_ZERO;
            c.language = *b"en";
            c.country = *b"US";
            c.smallest_screen_width_dp = 600;
            c.orientation = ORIENTATION_LAND;
            c.density = DENSITY_XHIGH;
            c.sdk_version = 21;
        });
        assert_eq!(c.to_string(), "mcc310-mnc00-en-rUS-sw600dp-land-xhdpi-v21");

        let c = config(|c| {
            c.language = *b"sr";
            c.locale_script = *b"Latn";
            c.density = 400;
        });
        assert_eq!(c.to_string(), "b+sr+Latn-400dpi");
    }

    #[test]
    fn display_axes_after_density() {
        let c = config(|c| {
            c.ui_mode = 0x20;
            c.density = 240;
            c.touchscreen = TOUCHSCREEN_FINGER;
            c.keyboard = 0x02;
            c.input_flags = 0x02 | 0x08;
            c.navigation = 0x02;
            c.screen_width = 1920;
            c.screen_height = 1080;
            c.sdk_version = 26;
        });
        assert_eq!(
            c.to_string(),
            "night-hdpi-finger-keyshidden-qwerty-navhidden-dpad-1920x1080-v26"
        );

        let c = config(|c| {
            c.density = 500;
            c.navigation = 0x09;
        });
        assert_eq!(c.to_string(), "500dpi-0x9");
    }
}
