#![no_main]

use libfuzzer_sys::fuzz_target;
use restable::{ResTableConfig, ResourceTable};

fuzz_target!(|data: &[u8]| {
    if data.len() < 12 {
        return;
    }

    let Ok(table) = ResourceTable::decode(data.to_vec()) else {
        return;
    };

    let requested = ResTableConfig::default();
    for group in table.groups() {
        for type_index in group.type_indices() {
            for type_entry in group.types(type_index) {
                let count = type_entry.entry_count.min(0x100) as u16;
                for entry_index in 0..count {
                    let res_id = u32::from(group.id) << 24
                        | u32::from(type_index + 1) << 16
                        | u32::from(entry_index);

                    if let Ok(value) = table.get_resource(res_id, Some(&requested)) {
                        let _ = table.resolve_reference(value, None);
                    }
                    let _ = table.get_bag(res_id, None);
                    let _ = table.get_resource_name(res_id);
                }
            }
        }
    }
});
