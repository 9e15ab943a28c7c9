#![forbid(unsafe_code)]

/// Due to limitations in Rust's proc-macro API, there is currently no way to
/// signal that a specific procedural macro should be rerun if
/// an external file changes or is added.
///
/// `embed_migrations!` therefore cannot regenerate the list of embedded
/// migrations when only the SQL files change, so the crate is rebuilt whenever
/// the migration directory changes.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
