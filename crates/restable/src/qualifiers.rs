//! Resource qualifier strings, e.g. `mcc310-en-rUS-sw600dp-land-xhdpi-v21`
//!
//! Qualifiers are dash separated and must appear in their canonical order.
//! Every axis accepts `any`, which leaves it unspecified.

use std::str::FromStr;

use phf::phf_map;
use winnow::ascii::digit1;
use winnow::combinator::{opt, preceded, separated_pair, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::errors::ConfigParseError;
use crate::structs::locale::{fill_field, pack_language, pack_region};
use crate::structs::{
    DENSITY_ANY, MASK_GRAMMATICAL_GENDER, MASK_HDR, MASK_KEYSHIDDEN, MASK_LAYOUTDIR,
    MASK_NAVHIDDEN, MASK_SCREENLONG, MASK_SCREENROUND, MASK_SCREENSIZE, MASK_UI_MODE_NIGHT,
    MASK_UI_MODE_TYPE, MASK_WIDE_COLOR_GAMUT, MNC_ZERO, ResTableConfig, UI_MODE_TYPE_VR_HEADSET,
};

const WILDCARD: &str = "any";

pub static GRAMMATICAL_GENDERS: phf::Map<&'static str, u16> = phf_map! {
    "neuter" => 0x01,
    "feminine" => 0x02,
    "masculine" => 0x03,
};

pub static LAYOUT_DIRS: phf::Map<&'static str, u16> = phf_map! {
    "ldltr" => 0x40,
    "ldrtl" => 0x80,
};

pub static SCREEN_SIZES: phf::Map<&'static str, u16> = phf_map! {
    "small" => 0x01,
    "normal" => 0x02,
    "large" => 0x03,
    "xlarge" => 0x04,
};

pub static SCREEN_LONG: phf::Map<&'static str, u16> = phf_map! {
    "notlong" => 0x10,
    "long" => 0x20,
};

pub static SCREEN_ROUND: phf::Map<&'static str, u16> = phf_map! {
    "notround" => 0x01,
    "round" => 0x02,
};

pub static WIDE_COLOR_GAMUT: phf::Map<&'static str, u16> = phf_map! {
    "nowidecg" => 0x01,
    "widecg" => 0x02,
};

pub static HDR: phf::Map<&'static str, u16> = phf_map! {
    "lowdr" => 0x04,
    "highdr" => 0x08,
};

pub static ORIENTATIONS: phf::Map<&'static str, u16> = phf_map! {
    "port" => 0x01,
    "land" => 0x02,
    "square" => 0x03,
};

/// `normal` (0x01) has no qualifier, it's the absence of any other type
pub static UI_MODE_TYPES: phf::Map<&'static str, u16> = phf_map! {
    "desk" => 0x02,
    "car" => 0x03,
    "television" => 0x04,
    "appliance" => 0x05,
    "watch" => 0x06,
    "vrheadset" => 0x07,
};

pub static UI_MODE_NIGHT: phf::Map<&'static str, u16> = phf_map! {
    "notnight" => 0x10,
    "night" => 0x20,
};

pub static DENSITIES: phf::Map<&'static str, u16> = phf_map! {
    "ldpi" => 120,
    "mdpi" => 160,
    "tvdpi" => 213,
    "hdpi" => 240,
    "xhdpi" => 320,
    "xxhdpi" => 480,
    "xxxhdpi" => 640,
    "anydpi" => 0xfffe,
    "nodpi" => 0xffff,
};

pub static TOUCHSCREENS: phf::Map<&'static str, u16> = phf_map! {
    "notouch" => 0x01,
    "stylus" => 0x02,
    "finger" => 0x03,
};

pub static KEYS_HIDDEN: phf::Map<&'static str, u16> = phf_map! {
    "keysexposed" => 0x01,
    "keyshidden" => 0x02,
    "keyssoft" => 0x03,
};

pub static KEYBOARDS: phf::Map<&'static str, u16> = phf_map! {
    "nokeys" => 0x01,
    "qwerty" => 0x02,
    "12key" => 0x03,
};

pub static NAV_HIDDEN: phf::Map<&'static str, u16> = phf_map! {
    "navexposed" => 0x04,
    "navhidden" => 0x08,
};

pub static NAVIGATIONS: phf::Map<&'static str, u16> = phf_map! {
    "nonav" => 0x01,
    "dpad" => 0x02,
    "trackball" => 0x03,
    "wheel" => 0x04,
};

/// Qualifier name of `value` in `table`
pub(crate) fn name_of(table: &phf::Map<&'static str, u16>, value: u16) -> Option<&'static str> {
    table
        .entries()
        .find(|(_, v)| **v == value)
        .map(|(name, _)| *name)
}

/// Decimal number, digits that don't fit are a hard failure
fn number(input: &mut &str) -> ModalResult<u16> {
    let digits = digit1.parse_next(input)?;
    digits
        .parse::<u16>()
        .map_err(|_| ErrMode::Cut(ContextError::new()))
}

/// Run `parser` over the whole `token`
///
/// `Ok(None)` means the token is not this qualifier and should be tried against the next one.
fn qualifier<'a, O>(
    token: &'a str,
    mut parser: impl Parser<&'a str, O, ErrMode<ContextError>>,
) -> Result<Option<O>, ConfigParseError> {
    let mut input = token;

    match parser.parse_next(&mut input) {
        Ok(out) if input.is_empty() => Ok(Some(out)),
        Ok(_) | Err(ErrMode::Backtrack(_)) | Err(ErrMode::Incomplete(_)) => Ok(None),
        Err(ErrMode::Cut(_)) => Err(ConfigParseError::InvalidNumber(token.to_owned())),
    }
}

fn keyword(token: &str, table: &phf::Map<&'static str, u16>) -> Option<u16> {
    if token == WILDCARD {
        return Some(0);
    }

    table.get(token).copied()
}

/// Replace the `mask` bits of `field` with `value`
#[inline]
fn set_masked(field: &mut u8, mask: u8, value: u16) {
    *field = (*field & !mask) | (value as u8 & mask);
}

type Step = fn(&str, &mut ResTableConfig) -> Result<bool, ConfigParseError>;

fn parse_mcc(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    if token == WILDCARD {
        config.mcc = 0;
        return Ok(true);
    }

    match qualifier(token, preceded("mcc", number))? {
        Some(mcc) => {
            config.mcc = mcc;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn parse_mnc(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    if token == WILDCARD {
        config.mnc = 0;
        return Ok(true);
    }

    match qualifier(token, preceded("mnc", number))? {
        Some(0) => config.mnc = MNC_ZERO,
        Some(mnc) => config.mnc = mnc,
        None => return Ok(false),
    }

    Ok(true)
}

fn is_alpha(part: &str) -> bool {
    part.bytes().all(|c| c.is_ascii_alphabetic())
}

fn titlecase(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    for (i, c) in script.chars().enumerate() {
        if i == 0 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Language subtags of a locale, as written to the configuration
#[derive(Default)]
struct Locale {
    language: String,
    region: String,
    script: String,
    variant: String,
}

impl Locale {
    /// `b+` form: `b+lang[+script][+region][+variant]` with `+` instead of `-`
    fn from_bcp47(token: &str) -> Result<Locale, ConfigParseError> {
        let invalid = || ConfigParseError::InvalidLocale(token.to_owned());
        let subtags: Vec<&str> = token[2..].split('+').collect();

        let mut locale = Locale {
            language: subtags[0].to_owned(),
            ..Locale::default()
        };

        if !(2..=3).contains(&locale.language.len()) || !is_alpha(&locale.language) {
            return Err(invalid());
        }

        let is_variant = |tag: &str| {
            (5..=8).contains(&tag.len())
                || (tag.len() == 4 && tag.as_bytes()[0].is_ascii_digit())
        };

        match &subtags[1..] {
            [] => {}
            [second] => match second.len() {
                2 | 3 => locale.region = second.to_ascii_uppercase(),
                _ if is_variant(second) => locale.variant = second.to_string(),
                4 => locale.script = titlecase(second),
                _ => return Err(invalid()),
            },
            [second, third] => {
                match second.len() {
                    4 => locale.script = titlecase(second),
                    2 | 3 => locale.region = second.to_ascii_uppercase(),
                    _ => return Err(invalid()),
                }

                if third.len() >= 4 {
                    locale.variant = third.to_string();
                } else {
                    locale.region = third.to_ascii_uppercase();
                }
            }
            [script, region, variant] => {
                locale.script = titlecase(script);
                locale.region = region.to_ascii_uppercase();
                locale.variant = variant.to_string();
            }
            _ => return Err(invalid()),
        }

        if locale.variant.len() > 8 {
            return Err(invalid());
        }

        Ok(locale)
    }

    fn write_to(&self, config: &mut ResTableConfig) {
        config.language = pack_language(&self.language);
        config.country = pack_region(&self.region);
        config.locale_script = fill_field(&self.script);
        config.locale_variant = fill_field(&self.variant);
        config.locale_script_was_computed = false;
    }
}

/// Region qualifier following a plain language: `rUS` or `r419`
fn region_subtag(input: &mut &str) -> ModalResult<String> {
    preceded(
        'r',
        take_while(2..=3, |c: char| c.is_ascii_alphanumeric()).verify(|region: &str| {
            (region.len() == 2 && is_alpha(region))
                || (region.len() == 3 && region.bytes().all(|c| c.is_ascii_digit()))
        }),
    )
    .map(str::to_ascii_uppercase)
    .parse_next(input)
}

fn parse_gender(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &GRAMMATICAL_GENDERS)
        .map(|v| set_masked(&mut config.grammatical_inflection, MASK_GRAMMATICAL_GENDER, v))
        .is_some())
}

fn parse_layout_dir(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &LAYOUT_DIRS)
        .map(|v| set_masked(&mut config.screen_layout, MASK_LAYOUTDIR, v))
        .is_some())
}

fn dp_qualifier(
    token: &str,
    prefix: &'static str,
    field: &mut u16,
) -> Result<bool, ConfigParseError> {
    if token == WILDCARD {
        *field = 0;
        return Ok(true);
    }

    match qualifier(token, preceded(prefix, terminated(number, "dp")))? {
        Some(value) => {
            *field = value;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn parse_smallest_width(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    dp_qualifier(token, "sw", &mut config.smallest_screen_width_dp)
}

fn parse_width(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    dp_qualifier(token, "w", &mut config.screen_width_dp)
}

fn parse_height(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    dp_qualifier(token, "h", &mut config.screen_height_dp)
}

fn parse_screen_size(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &SCREEN_SIZES)
        .map(|v| set_masked(&mut config.screen_layout, MASK_SCREENSIZE, v))
        .is_some())
}

fn parse_screen_long(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &SCREEN_LONG)
        .map(|v| set_masked(&mut config.screen_layout, MASK_SCREENLONG, v))
        .is_some())
}

fn parse_screen_round(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &SCREEN_ROUND)
        .map(|v| set_masked(&mut config.screen_layout2, MASK_SCREENROUND, v))
        .is_some())
}

fn parse_wide_color_gamut(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &WIDE_COLOR_GAMUT)
        .map(|v| set_masked(&mut config.color_mode, MASK_WIDE_COLOR_GAMUT, v))
        .is_some())
}

fn parse_hdr(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &HDR)
        .map(|v| set_masked(&mut config.color_mode, MASK_HDR, v))
        .is_some())
}

fn parse_orientation(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &ORIENTATIONS)
        .map(|v| config.orientation = v as u8)
        .is_some())
}

fn parse_ui_mode_type(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &UI_MODE_TYPES)
        .map(|v| set_masked(&mut config.ui_mode, MASK_UI_MODE_TYPE, v))
        .is_some())
}

fn parse_ui_mode_night(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &UI_MODE_NIGHT)
        .map(|v| set_masked(&mut config.ui_mode, MASK_UI_MODE_NIGHT, v))
        .is_some())
}

fn parse_density(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    if let Some(density) = keyword(token, &DENSITIES) {
        config.density = density;
        return Ok(true);
    }

    match qualifier(token, terminated(number, "dpi"))? {
        Some(density) => {
            config.density = density;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn parse_touchscreen(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &TOUCHSCREENS)
        .map(|v| config.touchscreen = v as u8)
        .is_some())
}

fn parse_keys_hidden(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &KEYS_HIDDEN)
        .map(|v| set_masked(&mut config.input_flags, MASK_KEYSHIDDEN, v))
        .is_some())
}

fn parse_keyboard(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &KEYBOARDS)
        .map(|v| config.keyboard = v as u8)
        .is_some())
}

fn parse_nav_hidden(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &NAV_HIDDEN)
        .map(|v| set_masked(&mut config.input_flags, MASK_NAVHIDDEN, v))
        .is_some())
}

fn parse_navigation(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    Ok(keyword(token, &NAVIGATIONS)
        .map(|v| config.navigation = v as u8)
        .is_some())
}

/// `WxH` in pixels, the larger dimension goes first
fn parse_screen_pixels(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    if token == WILDCARD {
        config.screen_width = 0;
        config.screen_height = 0;
        return Ok(true);
    }

    match qualifier(token, separated_pair(number, 'x', number))? {
        Some((width, height)) if width >= height => {
            config.screen_width = width;
            config.screen_height = height;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn parse_version(token: &str, config: &mut ResTableConfig) -> Result<bool, ConfigParseError> {
    if token == WILDCARD {
        config.sdk_version = 0;
        config.minor_version = 0;
        return Ok(true);
    }

    match qualifier(token, preceded('v', (number, opt(preceded('.', number)))))? {
        Some((sdk, minor)) => {
            config.sdk_version = sdk;
            config.minor_version = minor.unwrap_or_default();
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Qualifiers following the locale, in canonical order
const STEPS: &[Step] = &[
    parse_gender,
    parse_layout_dir,
    parse_smallest_width,
    parse_width,
    parse_height,
    parse_screen_size,
    parse_screen_long,
    parse_screen_round,
    parse_wide_color_gamut,
    parse_hdr,
    parse_orientation,
    parse_ui_mode_type,
    parse_ui_mode_night,
    parse_density,
    parse_touchscreen,
    parse_keys_hidden,
    parse_keyboard,
    parse_nav_hidden,
    parse_navigation,
    parse_screen_pixels,
    parse_version,
];

/// Parse a qualifier string into a configuration
///
/// Keywords are case-insensitive, an empty string is the default configuration.
/// Minimum platform versions are not implied, see [apply_version_for_compatibility].
pub fn parse_qualifiers(qualifiers: &str) -> Result<ResTableConfig, ConfigParseError> {
    let mut config = ResTableConfig {
        size: ResTableConfig::SIZE,
        ..ResTableConfig::default()
    };

    if qualifiers.is_empty() {
        return Ok(config);
    }

    let lowered = qualifiers.to_ascii_lowercase();
    let mut tokens = lowered.split('-').peekable();

    for step in [parse_mcc as Step, parse_mnc] {
        if let Some(token) = tokens.peek() {
            if step(token, &mut config)? {
                tokens.next();
            }
        }
    }

    // locale may span two tokens
    if let Some(token) = tokens.peek() {
        if *token == WILDCARD {
            tokens.next();
        } else if token.starts_with("b+") {
            Locale::from_bcp47(token)?.write_to(&mut config);
            tokens.next();
        } else if (2..=3).contains(&token.len()) && is_alpha(token) && *token != "car" {
            let mut locale = Locale {
                language: token.to_string(),
                ..Locale::default()
            };
            tokens.next();

            if let Some(next) = tokens.peek() {
                if let Some(region) = qualifier(next, region_subtag)? {
                    locale.region = region;
                    tokens.next();
                }
            }

            locale.write_to(&mut config);
        }
    }

    for step in STEPS {
        if let Some(token) = tokens.peek() {
            if step(token, &mut config)? {
                tokens.next();
            }
        }
    }

    match tokens.next() {
        Some(token) => Err(ConfigParseError::UnexpectedQualifier(token.to_owned())),
        None => Ok(config),
    }
}

/// Raise the sdk version to the first platform release that understands the used qualifiers
pub fn apply_version_for_compatibility(config: &mut ResTableConfig) {
    let min_sdk = if config.ui_mode & MASK_UI_MODE_TYPE == UI_MODE_TYPE_VR_HEADSET
        || config.color_mode & (MASK_WIDE_COLOR_GAMUT | MASK_HDR) != 0
    {
        26
    } else if config.screen_layout2 & MASK_SCREENROUND != 0 {
        23
    } else if config.density == DENSITY_ANY {
        21
    } else if config.smallest_screen_width_dp != 0
        || config.screen_width_dp != 0
        || config.screen_height_dp != 0
    {
        13
    } else if config.ui_mode & (MASK_UI_MODE_TYPE | MASK_UI_MODE_NIGHT) != 0 {
        8
    } else if config.screen_layout & (MASK_SCREENSIZE | MASK_SCREENLONG) != 0 || config.density != 0 {
        4
    } else {
        0
    };

    if min_sdk > config.sdk_version {
        config.sdk_version = min_sdk;
    }
}

impl FromStr for ResTableConfig {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_qualifiers(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{DENSITY_XHIGH, ORIENTATION_LAND};

    #[test]
    fn mcc_mnc() {
        let config = parse_qualifiers("mcc310-mnc004").unwrap();
        assert_eq!(config.mcc, 310);
        assert_eq!(config.mnc, 4);

        let config = parse_qualifiers("mcc310-mnc00").unwrap();
        assert_eq!(config.mnc, MNC_ZERO);
    }

    #[test]
    fn screen_dp() {
        assert_eq!(
            parse_qualifiers("sw320dp").unwrap().smallest_screen_width_dp,
            320
        );
        assert_eq!(parse_qualifiers("w480dp").unwrap().screen_width_dp, 480);
        assert_eq!(parse_qualifiers("h1024dp").unwrap().screen_height_dp, 1024);
    }

    #[test]
    fn full_qualifier_string() {
        let config = parse_qualifiers("mcc310-mnc004-en-rUS-sw320dp-w480dp-h1024dp-v26").unwrap();
        assert_eq!(config.mcc, 310);
        assert_eq!(config.mnc, 4);
        assert_eq!(config.language, *b"en");
        assert_eq!(config.country, *b"US");
        assert_eq!(config.smallest_screen_width_dp, 320);
        assert_eq!(config.screen_width_dp, 480);
        assert_eq!(config.screen_height_dp, 1024);
        assert_eq!(config.sdk_version, 26);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let config = parse_qualifiers("LAND-XHDPI").unwrap();
        assert_eq!(config.orientation, ORIENTATION_LAND);
        assert_eq!(config.density, DENSITY_XHIGH);
    }

    #[test]
    fn bcp47_locale() {
        let config = parse_qualifiers("b+sr+Latn+RS").unwrap();
        assert_eq!(config.language, *b"sr");
        assert_eq!(config.country, *b"RS");
        assert_eq!(&config.locale_script, b"Latn");

        let config = parse_qualifiers("b+es+419").unwrap();
        assert_eq!(config.region_string(), "419");

        assert!(matches!(
            parse_qualifiers("b+toolonglanguage"),
            Err(ConfigParseError::InvalidLocale(_))
        ));
    }

    #[test]
    fn car_is_not_a_language() {
        let config = parse_qualifiers("car").unwrap();
        assert_eq!(config.language, [0, 0]);
        assert_eq!(config.ui_mode & MASK_UI_MODE_TYPE, 0x03);
    }

    #[test]
    fn density_forms() {
        assert_eq!(parse_qualifiers("400dpi").unwrap().density, 400);
        assert_eq!(parse_qualifiers("anydpi").unwrap().density, DENSITY_ANY);
        assert_eq!(parse_qualifiers("nodpi").unwrap().density, 0xffff);
    }

    #[test]
    fn screen_pixels_and_version() {
        let config = parse_qualifiers("640x480-v21.1").unwrap();
        assert_eq!((config.screen_width, config.screen_height), (640, 480));
        assert_eq!((config.sdk_version, config.minor_version), (21, 1));

        // width must not be smaller than height
        assert!(parse_qualifiers("480x640").is_err());
    }

    #[test]
    fn out_of_order_is_an_error() {
        assert_eq!(
            parse_qualifiers("v21-land").unwrap_err(),
            ConfigParseError::UnexpectedQualifier("land".to_owned())
        );
        assert_eq!(
            parse_qualifiers("bogus").unwrap_err(),
            ConfigParseError::UnexpectedQualifier("bogus".to_owned())
        );
    }

    #[test]
    fn number_overflow() {
        assert_eq!(
            parse_qualifiers("sw99999dp").unwrap_err(),
            ConfigParseError::InvalidNumber("sw99999dp".to_owned())
        );
    }

    #[test]
    fn empty_and_wildcard() {
        assert!(parse_qualifiers("").unwrap().is_default());
        assert!(parse_qualifiers("any").unwrap().is_default());
    }

    #[test]
    fn wildcard_locale_is_unspecified() {
        let config = parse_qualifiers("mcc310-mnc004-any-land").unwrap();
        assert_eq!(config.mnc, 4);
        assert_eq!(config.language, [0, 0]);
        assert_eq!(config.country, [0, 0]);
        assert_eq!(config.orientation, ORIENTATION_LAND);

        let config = parse_qualifiers("mcc310-any-any").unwrap();
        assert_eq!(config.mcc, 310);
        assert_eq!(config.language, [0, 0]);
        assert!(parse_qualifiers("mcc310-mnc004-any-fr").is_err());
    }

    #[test]
    fn version_for_compatibility() {
        let mut config = parse_qualifiers("sw600dp").unwrap();
        assert_eq!(config.sdk_version, 0);
        apply_version_for_compatibility(&mut config);
        assert_eq!(config.sdk_version, 13);

        let mut config = parse_qualifiers("round-v21").unwrap();
        apply_version_for_compatibility(&mut config);
        assert_eq!(config.sdk_version, 23);

        let mut config = parse_qualifiers("hdpi-v26").unwrap();
        apply_version_for_compatibility(&mut config);
        assert_eq!(config.sdk_version, 26);
    }

    #[test]
    fn display_round_trip() {
        for qualifiers in [
            "mcc310-mnc00-en-rUS-sw600dp-land-xhdpi-v21",
            "b+sr+Latn-ldrtl-night",
            "fr-rCA-large-long-port-car-keyshidden-qwerty",
            "widecg-highdr-400dpi-640x480",
        ] {
            let config: ResTableConfig = qualifiers.parse().unwrap();
            assert_eq!(config.to_string(), qualifiers);
        }
    }
}
