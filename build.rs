//! Build script for detecting system dependencies and providing installation guidance.
//!
//! This script checks for OpenCV and pkg-config, which the build needs, and
//! for the Python runtime used by the default landmark bridge at run time.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    check_opencv();
    check_pkg_config();
    check_bridge_runtime();

    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    let version = ["opencv4", "opencv"].iter().find_map(|name| {
        Command::new("pkg-config")
            .args(["--modversion", name])
            .output()
            .ok()
            .filter(|output| output.status.success())
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
    });

    match version {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev clang libclang-dev");
            println!("cargo:warning=On macOS: brew install opencv");
        }
    }
}

fn check_pkg_config() {
    let found = Command::new("pkg-config")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);

    if !found {
        println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
        println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
        println!("cargo:warning=On macOS: brew install pkg-config");
    }
}

fn check_bridge_runtime() {
    let found = Command::new("python3")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);

    if !found {
        println!("cargo:warning=python3 not found. The default landmark bridge (bridge/landmark_bridge.py) needs it.");
        println!("cargo:warning=Install Python 3 and run: pip install mediapipe numpy");
    }
}
