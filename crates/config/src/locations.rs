// SPDX-License-Identifier: MIT

//! Ordered list of candidate config file locations, mirroring
//! `gluetube/util.py::conf_dir` (local first, system-wide last).

use std::path::PathBuf;

/// Default search order for `gluetube.cfg`, local to system-wide.
pub fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![
        PathBuf::from("./gluetube.cfg"),
        PathBuf::from("cfg/gluetube.cfg"),
    ];

    if let Ok(home) = std::env::var("HOME") {
        locations.push(PathBuf::from(home).join(".gluetube/etc/gluetube.cfg"));
    }

    locations.extend([
        PathBuf::from("/usr/local/etc/gluetube/gluetube.cfg"),
        PathBuf::from("/etc/opt/gluetube/gluetube.cfg"),
        PathBuf::from("/etc/gluetube/gluetube.cfg"),
    ]);

    locations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_locations_come_before_system_locations() {
        let locations = default_locations();
        let local_idx = locations
            .iter()
            .position(|p| p == &PathBuf::from("./gluetube.cfg"))
            .expect("local location present");
        let system_idx = locations
            .iter()
            .position(|p| p == &PathBuf::from("/etc/gluetube/gluetube.cfg"))
            .expect("system location present");
        assert!(local_idx < system_idx);
    }
}
