use cfg_aliases::cfg_aliases;

fn main() {
    // The script doesn't depend on our code
    println!("cargo:rerun-if-changed=build.rs");
    // But it *does* depend on cfgs!
    println!("cargo:rerun-if-env-changed=RUSTFLAGS");
    println!("cargo:rerun-if-env-changed=RUSTDOCFLAGS");

    // Short phrase meaning the feature is requested *and* the platform can load the driver's dll (or we're documenting).
    // Enabling "wacom-feel" shouldn't compile err on Linux.
    cfg_aliases! {
        feel_mt: { all(feature = "wacom-feel", any(docsrs, target_os = "windows")) },
    }
}
