// This crate exists only for workspace version management; see Cargo.toml.
