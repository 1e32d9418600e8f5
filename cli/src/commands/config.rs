use anyhow::{Context, Result};
use colored::Colorize;
use restable::parse_qualifiers;
use restable::qualifiers::apply_version_for_compatibility;

pub(crate) fn command_config(qualifiers: &str, compat: bool) -> Result<()> {
    let mut config = parse_qualifiers(qualifiers)
        .with_context(|| format!("got error while parsing qualifiers: {:?}", qualifiers))?;

    if compat {
        apply_version_for_compatibility(&mut config);
    }

    println!("{}: {}", "Qualifiers", config.to_string().green());

    let fields: [(&str, String); 12] = [
        ("mcc", config.mcc.to_string()),
        ("mnc", config.mnc.to_string()),
        ("language", config.language_string()),
        ("region", config.region_string()),
        ("density", config.density.to_string()),
        ("smallestScreenWidthDp", config.smallest_screen_width_dp.to_string()),
        ("screenWidthDp", config.screen_width_dp.to_string()),
        ("screenHeightDp", config.screen_height_dp.to_string()),
        ("screenWidth", config.screen_width.to_string()),
        ("screenHeight", config.screen_height.to_string()),
        ("sdkVersion", config.sdk_version.to_string()),
        ("uiMode", format!("0x{:02x}", config.ui_mode)),
    ];

    for (name, value) in fields {
        if value.is_empty() {
            continue;
        }
        println!("  {}: {}", name, value);
    }

    Ok(())
}
