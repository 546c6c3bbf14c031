use std::env;

fn main() {
    // Optional build-time station credentials, seeded into the parameter
    // store on first boot when the store has no credentials of its own.

    if let Ok(ssid) = env::var("SLOTBOOT_SSID") {
        println!("cargo:rustc-env=SLOTBOOT_SSID={}", ssid);
        println!("cargo:warning=Using SLOTBOOT_SSID from environment: {}", ssid);
    } else {
        println!("cargo:rustc-env=SLOTBOOT_SSID=");
    }

    if let Ok(pass) = env::var("SLOTBOOT_PASS") {
        println!("cargo:rustc-env=SLOTBOOT_PASS={}", pass);
        println!("cargo:warning=Using SLOTBOOT_PASS from environment (hidden)");
    } else {
        println!("cargo:rustc-env=SLOTBOOT_PASS=");
    }

    println!("cargo:rerun-if-env-changed=SLOTBOOT_SSID");
    println!("cargo:rerun-if-env-changed=SLOTBOOT_PASS");
}
