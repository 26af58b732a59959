pub mod scan_local_tree;
