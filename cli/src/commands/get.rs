use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use restable::structs::make_resource_id;
use restable::{ResTableConfig, ResolveError, ResolvedValue, ResourceOptions, ResourceTable};

pub(crate) fn command_get(
    path: &Path,
    resource: &str,
    config: Option<&ResTableConfig>,
    density: u16,
    json: bool,
    resolve: bool,
) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("can't read file: {:?}", path))?;
    let mut table = ResourceTable::decode(data)
        .with_context(|| format!("got error while parsing resource table: {:?}", path))?;

    if let Some(config) = config {
        table.set_configuration(*config);
    }

    let res_id = resource_id(&table, resource)?;
    let requested = *table.configuration();
    let options = ResourceOptions {
        resolve_refs: resolve,
        density,
        may_be_bag: true,
    };

    let value = match table.get_resource_with(res_id, Some(&requested), &options) {
        Ok(value) if resolve => table
            .resolve_reference(value, Some(&requested))
            .with_context(|| format!("can't resolve references of 0x{:08x}", res_id))?,
        Ok(value) => value,
        Err(ResolveError::ComplexEntry(_)) => return print_bag(&table, res_id, &requested, json),
        Err(err) => return Err(err).with_context(|| format!("can't get resource 0x{:08x}", res_id)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_value(&table, res_id, &value);
    Ok(())
}

/// Accepts `0x7f040001` as well as `[package:]type/entry`
fn resource_id(table: &ResourceTable, resource: &str) -> Result<u32> {
    if let Some(hex) = resource.strip_prefix("0x").or_else(|| resource.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16)
            .with_context(|| format!("invalid resource id: {:?}", resource));
    }

    let default_package = table.groups().first().map(|group| group.name.as_str());
    if let Some(id) = table.identifier(resource, None, default_package) {
        return Ok(id);
    }

    // a bare `type/index` pair is useful when the key strings are obfuscated
    if let Some((type_, index)) = resource.split_once('/')
        && let Ok(index) = index.parse::<u16>()
        && let Some(group) = table.groups().first()
        && let Some(type_index) = group.packages.iter().find_map(|p| p.type_strings.index_of(type_))
    {
        return Ok(make_resource_id(group.id, type_index as u8 + 1, index));
    }

    bail!("unknown resource: {:?}", resource)
}

fn print_value(table: &ResourceTable, res_id: u32, value: &ResolvedValue) {
    let name = table
        .get_resource_name(value.res_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|_| "-".to_owned());

    println!("{}: 0x{:08x}", "Resource", res_id);
    if value.res_id != res_id {
        println!("{}: 0x{:08x}", "Resolved", value.res_id);
    }
    println!("{}: {}", "Name", name.green());
    println!("{}: {}", "Config", value.config.to_string().green());
    println!("{}: {}", "Type", value.value.data_type);
    println!("{}: 0x{:08x}", "Data", value.value.data);
    if let Some(string) = &value.string {
        println!("{}: {:?}", "String", string);
    }
    println!("{}: 0x{:08x}", "Spec Flags", value.type_spec_flags);
}

fn print_bag(table: &ResourceTable, res_id: u32, config: &ResTableConfig, json: bool) -> Result<()> {
    let bag = table
        .get_bag(res_id, Some(config))
        .with_context(|| format!("can't get bag 0x{:08x}", res_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(bag.as_ref())?);
        return Ok(());
    }

    println!("{}: 0x{:08x}", "Bag", res_id);
    if bag.parent != 0 {
        println!("{}: 0x{:08x}", "Parent", bag.parent);
    }

    for entry in &bag.entries {
        let name = table
            .get_resource_name(entry.name)
            .map(|name| name.to_string())
            .unwrap_or_else(|_| format!("0x{:08x}", entry.name));

        print!("  {} = {} 0x{:08x}", name.green(), entry.value.data_type, entry.value.data);
        if let Some(string) = &entry.string {
            print!(" {:?}", string);
        }
        println!();
    }

    Ok(())
}
