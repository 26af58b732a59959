pub mod propfind_body;
