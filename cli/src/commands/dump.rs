use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use restable::ResourceTable;
use restable::package_group::PackageGroup;

use crate::commands::path_helpers::get_all_files;

pub(crate) fn command_dump(paths: &[PathBuf]) -> Result<()> {
    let files: Vec<PathBuf> = get_all_files(paths, &["arsc"]).collect();

    for (i, path) in files.iter().enumerate() {
        dump(path)?;

        // Add a newline between tables except after the last one
        if i != files.len() - 1 {
            println!();
        }
    }

    Ok(())
}

fn dump(path: &Path) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("can't read file: {:?}", path))?;
    let table = ResourceTable::decode(data)
        .with_context(|| format!("got error while parsing resource table: {:?}", path))?;

    println!("{}: {}", "File".bold(), path.display().to_string().green());
    println!("{}: {}", "Package Groups", table.groups().len().to_string().green());

    for group in table.groups() {
        dump_group(group);
    }

    let issues: Vec<_> = table.tables().iter().flat_map(|t| t.issues.iter()).collect();
    if !issues.is_empty() {
        println!("\n{}:", "Issues".yellow().bold());
        for issue in issues {
            println!("  {}", issue);
        }
    }

    Ok(())
}

fn dump_group(group: &PackageGroup) {
    println!(
        "\n{} 0x{:02x} {}{}",
        "Package".blue().bold(),
        group.id,
        group.name.green(),
        if group.is_dynamic { " (shared library)" } else { "" }
    );

    let libraries = group.dynamic_ref_table.entries();
    if !libraries.is_empty() {
        let mut libraries: Vec<_> = libraries.iter().collect();
        libraries.sort();
        println!("  {}:", "Libraries");
        for (name, id) in libraries {
            println!("    0x{:02x} {}", id, name);
        }
    }

    for type_index in group.type_indices() {
        for type_entry in group.types(type_index) {
            let type_name = type_entry
                .package
                .type_name(type_index + 1)
                .unwrap_or_else(|_| "?".to_owned());

            println!(
                "  {} 0x{:02x} {} entries={}{}",
                "type".cyan(),
                type_index + 1,
                type_name.green(),
                type_entry.entry_count,
                if type_entry.is_overlay() { " overlay" } else { "" }
            );

            for config in &type_entry.configs {
                println!(
                    "    {}{}",
                    config.config,
                    if config.is_sparse() { " (sparse)" } else { "" }
                );
            }
        }
    }
}
