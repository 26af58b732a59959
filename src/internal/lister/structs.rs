pub mod resource_info;
pub mod resource_lister;
pub mod resource_tree;
