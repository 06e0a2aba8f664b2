/// Firmware target triple.
pub const TARGET: &str = "thumbv7em-none-eabihf";

/// probe-rs chip name.
pub const CHIP: &str = "nRF52840_xxAA";

/// Firmware package and binary name.
pub const APP: &str = "flappy-app";

/// Library crates whose tests run on the host.
pub const HOST_CRATES: &[&str] = &[
    "bus-driver",
    "ht16k33-matrix",
    "tone-sequencer",
    "input-watcher",
    "flappy-game",
];

/// Path of the firmware ELF for the chosen profile.
pub fn app_elf(release: bool) -> String {
    let profile = if release { "release" } else { "debug" };
    format!("target/{TARGET}/{profile}/{APP}")
}
