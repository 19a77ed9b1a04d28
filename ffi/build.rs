//! Generates `include/remote_storage.h` from the `extern "C"` surface.

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let generated = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("REMOTE_STORAGE_H")
        .with_cpp_compat(true)
        .generate();

    match generated {
        Ok(bindings) => {
            bindings.write_to_file(format!("{crate_dir}/include/remote_storage.h"));
        }
        Err(err) => println!("cargo:warning=C header not generated: {err}"),
    }
}
