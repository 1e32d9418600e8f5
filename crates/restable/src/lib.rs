pub mod dynamic_ref;
pub mod errors;
pub mod idmap;
pub mod package_group;
pub mod qualifiers;
pub mod source;
pub mod structs;
pub mod table;

pub use dynamic_ref::DynamicRefTable;
pub use errors::{
    ConfigParseError, DecodeError, DynamicRefError, IdmapError, ResolveError, TableError,
};
pub use idmap::Idmap;
pub use qualifiers::parse_qualifiers;
pub use source::{AssetSource, DirectorySource};
pub use structs::{ResTableConfig, ResTableConfigFlags, ResourceValue, ResourceValueType};
pub use package_group::{Entry, PackageGroup};
pub use table::{Bag, BagEntry, ResolvedValue, ResourceName, ResourceOptions, ResourceTable};
