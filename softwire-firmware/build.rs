//! Build script for softwire-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates softwire.toml at compile time and generates `bus_config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Number of user GPIOs on the RP2040
const GPIO_COUNT: i64 = 30;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated contents of softwire.toml
struct BusSettings {
    scl: String,
    sda: String,
    scl_pin: i64,
    sda_pin: i64,
    bit_delay_ns: i64,
    max_wait_polls: i64,
    eeprom_address: i64,
    eeprom_register: i64,
}

/// Validate softwire.toml configuration at compile time
fn validate_config() -> BusSettings {
    println!("cargo:rerun-if-changed=softwire.toml");

    let config_path = Path::new("softwire.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: softwire.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a softwire.toml configuration file        ║\n\
            ║  naming the bus pins and timing. Create one in the               ║\n\
            ║  softwire-firmware directory.                                    ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read softwire.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in softwire.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let settings = validate_sections(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in softwire.toml                   ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=softwire.toml validated successfully");
    settings
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check [bus] and [eeprom], collecting every problem found
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) -> BusSettings {
    let bus = config.get("bus").and_then(|b| b.as_table());
    let eeprom = config.get("eeprom").and_then(|e| e.as_table());

    if bus.is_none() {
        errors.push("Missing [bus] section".to_string());
    }
    if eeprom.is_none() {
        errors.push("Missing [eeprom] section".to_string());
    }

    let string = |table: Option<&toml::Table>, section: &str, key: &str, errors: &mut Vec<String>| {
        match table.map(|t| t.get(key)) {
            Some(Some(toml::Value::String(s))) => s.clone(),
            Some(Some(_)) => {
                errors.push(format!("[{}] '{}' must be a string", section, key));
                String::new()
            }
            Some(None) => {
                errors.push(format!("[{}] missing '{}'", section, key));
                String::new()
            }
            None => String::new(),
        }
    };

    let integer = |table: Option<&toml::Table>,
                   section: &str,
                   key: &str,
                   range: (i64, i64),
                   default: Option<i64>,
                   errors: &mut Vec<String>| {
        match (table.map(|t| t.get(key)), default) {
            (Some(Some(toml::Value::Integer(v))), _) => {
                if *v < range.0 || *v > range.1 {
                    errors.push(format!(
                        "[{}] '{}' must be {}-{}",
                        section, key, range.0, range.1
                    ));
                }
                *v
            }
            (Some(Some(_)), _) => {
                errors.push(format!("[{}] '{}' must be an integer", section, key));
                0
            }
            (Some(None), Some(default)) => default,
            (Some(None), None) => {
                errors.push(format!("[{}] missing '{}'", section, key));
                0
            }
            (None, _) => 0,
        }
    };

    let scl = string(bus, "bus", "scl", errors);
    let sda = string(bus, "bus", "sda", errors);
    let scl_pin = pin_number(&scl, "scl", bus.is_some(), errors);
    let sda_pin = pin_number(&sda, "sda", bus.is_some(), errors);

    if bus.is_some() && scl_pin >= 0 && scl_pin == sda_pin {
        errors.push(format!("[bus] scl and sda both use gpio{}", scl_pin));
    }

    let bit_delay_us = integer(bus, "bus", "bit_delay_us", (1, 1_000), None, errors);
    let max_wait_polls = integer(
        bus,
        "bus",
        "max_wait_polls",
        (1, i64::from(u32::MAX)),
        Some(i64::from(u32::MAX)),
        errors,
    );
    let eeprom_address = integer(eeprom, "eeprom", "address", (0x08, 0x77), None, errors);
    let eeprom_register = integer(eeprom, "eeprom", "register", (0, 0xFF), Some(0), errors);

    BusSettings {
        scl,
        sda,
        scl_pin,
        sda_pin,
        bit_delay_ns: bit_delay_us * 1_000,
        max_wait_polls,
        eeprom_address,
        eeprom_register,
    }
}

/// GPIO number of a "gpioN" / "^gpioN" pin string, or -1 after recording an error
fn pin_number(s: &str, key: &str, present: bool, errors: &mut Vec<String>) -> i64 {
    if !present || s.is_empty() {
        return -1;
    }

    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('^').unwrap_or(trimmed);
    match trimmed.strip_prefix("gpio").and_then(|n| n.parse::<i64>().ok()) {
        Some(pin) if (0..GPIO_COUNT).contains(&pin) => pin,
        Some(pin) => {
            errors.push(format!("[bus] {} = \"{}\": gpio{} does not exist", key, s, pin));
            -1
        }
        None => {
            errors.push(format!("[bus] {} = \"{}\": expected \"gpioN\" or \"^gpioN\"", key, s));
            -1
        }
    }
}

/// Write `bus_config.rs` into OUT_DIR for `include!` by the firmware
fn generate_config(settings: &BusSettings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("bus_config.rs")).unwrap();

    writeln!(f, "// Generated by build.rs from softwire.toml").unwrap();
    writeln!(f, "pub const SCL: &str = {:?};", settings.scl.trim()).unwrap();
    writeln!(f, "pub const SDA: &str = {:?};", settings.sda.trim()).unwrap();
    writeln!(f, "pub const BIT_DELAY_NS: u32 = {};", settings.bit_delay_ns).unwrap();
    writeln!(f, "pub const MAX_WAIT_POLLS: u32 = {};", settings.max_wait_polls).unwrap();
    writeln!(f, "pub const EEPROM_ADDRESS: u8 = {:#04x};", settings.eeprom_address).unwrap();
    writeln!(f, "pub const EEPROM_REGISTER: u8 = {:#04x};", settings.eeprom_register).unwrap();
    writeln!(f).unwrap();
    writeln!(f, "/// Take the configured (SCL, SDA) pins from the peripherals").unwrap();
    writeln!(f, "macro_rules! bus_pins {{").unwrap();
    writeln!(
        f,
        "    ($p:expr) => {{ ($p.PIN_{}, $p.PIN_{}) }};",
        settings.scl_pin, settings.sda_pin
    )
    .unwrap();
    writeln!(f, "}}").unwrap();
}
