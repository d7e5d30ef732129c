//! Static sensor catalog
//!
//! Maps every known sensor identifier to its column layout and descriptive
//! metadata. Adding a new sensor type is a pure data change here; the schema
//! layer and the extractor pick it up without code changes.
//!
//! Covered devices: eSense earable, Muse S headband, Zephyr BioHarness 3.0
//! chest monitor, Empatica E4 wristband.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Definition of one physiological data stream
#[derive(Debug, Clone, Copy)]
pub struct SensorDef {
    /// Sensor identifier, also the SQLite table name
    pub name: &'static str,
    /// Ordered data columns, always led by `timestamp`
    pub columns: &'static [&'static str],
    /// Human-readable description
    pub description: &'static str,
    /// Physical units of the data columns
    pub units: &'static str,
    /// Nominal sampling rate
    pub sampling_rate: &'static str,
    /// Device/stream category label
    pub sensor_type: &'static str,
}

/// SQLite column type for a sensor data column
///
/// Timestamps are REAL seconds. EEG channel-quality labels and boolean flags
/// are small integers; everything else is a REAL measurement.
pub fn column_sql_type(column: &str) -> &'static str {
    if column == "timestamp" {
        return "REAL";
    }
    if column.starts_with("is_")
        || matches!(column, "TP9" | "AF7" | "AF8" | "TP10" | "worn_confidence")
    {
        "INTEGER"
    } else {
        "REAL"
    }
}

const DEFS: &[SensorDef] = &[
    // Nokia Bell Labs eSense earable
    SensorDef {
        name: "ear_acc_left",
        columns: &["timestamp", "ax", "ay", "az"],
        description: "Left ear accelerometer",
        units: "g (range -2 to +2)",
        sampling_rate: "100 Hz",
        sensor_type: "Earable accelerometer",
    },
    SensorDef {
        name: "ear_acc_right",
        columns: &["timestamp", "ax", "ay", "az"],
        description: "Right ear accelerometer",
        units: "g (range -2 to +2)",
        sampling_rate: "100 Hz",
        sensor_type: "Earable accelerometer",
    },
    SensorDef {
        name: "ear_gyro_left",
        columns: &["timestamp", "gx", "gy", "gz"],
        description: "Left ear gyroscope",
        units: "deg/s (range -500 to +500)",
        sampling_rate: "100 Hz",
        sensor_type: "Earable gyroscope",
    },
    SensorDef {
        name: "ear_gyro_right",
        columns: &["timestamp", "gx", "gy", "gz"],
        description: "Right ear gyroscope",
        units: "deg/s (range -500 to +500)",
        sampling_rate: "100 Hz",
        sensor_type: "Earable gyroscope",
    },
    SensorDef {
        name: "ear_ppg_left",
        columns: &["timestamp", "green", "ir", "red"],
        description: "Left ear photoplethysmography (PPG)",
        units: "unitless (light intensity)",
        sampling_rate: "100 Hz",
        sensor_type: "Earable PPG sensor",
    },
    SensorDef {
        name: "ear_ppg_right",
        columns: &["timestamp", "green", "ir", "red"],
        description: "Right ear photoplethysmography (PPG)",
        units: "unitless (light intensity)",
        sampling_rate: "100 Hz",
        sensor_type: "Earable PPG sensor",
    },
    // Muse S headband
    SensorDef {
        name: "forehead_acc",
        columns: &["timestamp", "ax", "ay", "az"],
        description: "Forehead accelerometer",
        units: "g (range -2 to +2)",
        sampling_rate: "52 Hz",
        sensor_type: "Forehead accelerometer",
    },
    SensorDef {
        name: "forehead_eeg_alpha_abs",
        columns: &["timestamp", "TP9", "AF7", "AF8", "TP10"],
        description: "Forehead EEG alpha-band absolute power",
        units: "Bels",
        sampling_rate: "10 Hz",
        sensor_type: "Forehead EEG",
    },
    SensorDef {
        name: "forehead_eeg_beta_abs",
        columns: &["timestamp", "TP9", "AF7", "AF8", "TP10"],
        description: "Forehead EEG beta-band absolute power",
        units: "Bels",
        sampling_rate: "10 Hz",
        sensor_type: "Forehead EEG",
    },
    SensorDef {
        name: "forehead_eeg_delta_abs",
        columns: &["timestamp", "TP9", "AF7", "AF8", "TP10"],
        description: "Forehead EEG delta-band absolute power",
        units: "Bels",
        sampling_rate: "10 Hz",
        sensor_type: "Forehead EEG",
    },
    SensorDef {
        name: "forehead_eeg_gamma_abs",
        columns: &["timestamp", "TP9", "AF7", "AF8", "TP10"],
        description: "Forehead EEG gamma-band absolute power",
        units: "Bels",
        sampling_rate: "10 Hz",
        sensor_type: "Forehead EEG",
    },
    SensorDef {
        name: "forehead_eeg_theta_abs",
        columns: &["timestamp", "TP9", "AF7", "AF8", "TP10"],
        description: "Forehead EEG theta-band absolute power",
        units: "Bels",
        sampling_rate: "10 Hz",
        sensor_type: "Forehead EEG",
    },
    SensorDef {
        name: "forehead_eeg_raw",
        columns: &["timestamp", "TP9", "AF7", "AF8", "TP10"],
        description: "Raw forehead EEG waveform",
        units: "uV (range 0.0 to 1682.815)",
        sampling_rate: "256 Hz",
        sensor_type: "Forehead EEG",
    },
    SensorDef {
        name: "forehead_gyro",
        columns: &["timestamp", "gx", "gy", "gz"],
        description: "Forehead gyroscope",
        units: "deg/s (range -245 to +245)",
        sampling_rate: "52 Hz",
        sensor_type: "Forehead gyroscope",
    },
    // Muse S device events and status
    SensorDef {
        name: "muse_blinks",
        columns: &["timestamp", "is_blink"],
        description: "Blink event detection",
        units: "1=blink, 0=no blink",
        sampling_rate: "10 Hz (when detected)",
        sensor_type: "Blink detection",
    },
    SensorDef {
        name: "muse_jaw_clenches",
        columns: &["timestamp", "is_clench"],
        description: "Jaw clench event detection",
        units: "1=clench, 0=no clench",
        sampling_rate: "10 Hz (when detected)",
        sensor_type: "Jaw clench detection",
    },
    SensorDef {
        name: "muse_device_battery",
        columns: &[
            "timestamp",
            "battery_level_muse",
            "battery_voltage_muse",
            "adc_voltage_muse",
            "temperature_muse",
        ],
        description: "Muse device battery and temperature status",
        units: "percent, mV, {-1=unavailable}, degC",
        sampling_rate: "0.1 Hz",
        sensor_type: "Device status",
    },
    SensorDef {
        name: "muse_device_fit",
        columns: &["timestamp", "TP9", "AF7", "AF8", "TP10"],
        description: "Muse per-electrode contact quality",
        units: "1=good, 2=medium, 4=poor",
        sampling_rate: "10 Hz",
        sensor_type: "Device fit detection",
    },
    SensorDef {
        name: "muse_device_touch",
        columns: &["timestamp", "is_touching"],
        description: "Forehead contact detection",
        units: "1=touching, 0=not touching",
        sampling_rate: "10 Hz",
        sensor_type: "Contact detection",
    },
    // Zephyr BioHarness 3.0 chest monitor
    SensorDef {
        name: "chest_raw_acc",
        columns: &["timestamp", "vertical", "lateral", "sagittal"],
        description: "Raw chest accelerometer",
        units: "12-bit raw (center 2048, 1g = 83 counts)",
        sampling_rate: "100 Hz",
        sensor_type: "Chest accelerometer",
    },
    SensorDef {
        name: "chest_bb_interval",
        columns: &["timestamp", "duration"],
        description: "Breath-to-breath interval",
        units: "ms",
        sampling_rate: "per detected breath",
        sensor_type: "Respiration detection",
    },
    SensorDef {
        name: "chest_physiology_summary",
        columns: &[
            "timestamp",
            "hr",
            "br",
            "posture",
            "hr_confidence",
            "hrv",
            "is_hr_unreliable",
            "is_br_unreliable",
            "is_hrv_unreliable",
        ],
        description: "Chest physiology summary",
        units: "bpm {25:240}, breaths/min {4:70}, deg {-180:180}, percent, ms, 1=unreliable",
        sampling_rate: "1 Hz",
        sensor_type: "Physiology monitoring",
    },
    SensorDef {
        name: "chest_raw_breathing",
        columns: &["timestamp", "breathing_waveform"],
        description: "Raw chest respiration waveform",
        units: "24-bit raw",
        sampling_rate: "25 Hz",
        sensor_type: "Respiration sensor",
    },
    SensorDef {
        name: "chest_raw_ecg",
        columns: &["timestamp", "ecg_waveform"],
        description: "Raw chest electrocardiogram",
        units: "12-bit (1 count = 0.0067025 mV)",
        sampling_rate: "250 Hz",
        sensor_type: "Electrocardiogram (ECG)",
    },
    SensorDef {
        name: "chest_rr_interval",
        columns: &["timestamp", "duration"],
        description: "R-to-R wave interval",
        units: "ms",
        sampling_rate: "per detected R-wave",
        sensor_type: "ECG R-wave detection",
    },
    SensorDef {
        name: "chest_sensor_summary",
        columns: &[
            "timestamp",
            "acc_magnitude",
            "acc_peak",
            "acc_peak_vertical_angle",
            "acc_peak_horizontal_angle",
            "ecg_amp_uncalibrated",
            "ecg_noise_uncalibrated",
        ],
        description: "Chest sensor summary",
        units: "VMU {0:16}, g {0:16}, deg {0:180}, deg {-180:180}, V {0:0.05}, V {0:0.05}",
        sampling_rate: "1 Hz",
        sensor_type: "Sensor summary",
    },
    // Zephyr activity and device status
    SensorDef {
        name: "zephyr_activity_summary",
        columns: &[
            "timestamp",
            "cumulative_impulse_load",
            "walking_step_count",
            "running_step_count",
            "bound_count",
            "jump_count",
            "minor_impact_count",
            "major_impact_count",
            "avg_force_dev_rate",
            "avg_step_impulse",
            "avg_step_period",
            "last_jump_flight_time",
        ],
        description: "Zephyr activity summary statistics",
        units: "newtons, steps, steps, jumps, impacts, impact force, gait parameters",
        sampling_rate: "1 Hz",
        sensor_type: "Activity monitoring",
    },
    SensorDef {
        name: "zephyr_device_status",
        columns: &[
            "timestamp",
            "battery_voltage",
            "battery_level",
            "device_temperature",
            "bluetooth_link_quality",
            "bluetooth_rssi",
            "bluetooth_tx_power",
            "worn_confidence",
            "is_button_press",
            "is_not_fitted_to_garment",
        ],
        description: "Zephyr device status",
        units: "V, percent, degC, link quality, dB, dBm, worn confidence, button state, fit state",
        sampling_rate: "1 Hz",
        sensor_type: "Device status",
    },
    // Empatica E4 wristband
    SensorDef {
        name: "wrist_acc",
        columns: &["timestamp", "ax", "ay", "az"],
        description: "Wrist accelerometer",
        units: "g (range -2 to +2)",
        sampling_rate: "32 Hz",
        sensor_type: "Wrist accelerometer",
    },
    SensorDef {
        name: "wrist_bvp",
        columns: &["timestamp", "bvp"],
        description: "Wrist blood volume pulse",
        units: "unitless (combined from two light reflection measurements)",
        sampling_rate: "64 Hz",
        sensor_type: "Wrist PPG sensor",
    },
    SensorDef {
        name: "wrist_eda",
        columns: &["timestamp", "eda"],
        description: "Wrist electrodermal activity",
        units: "microsiemens (uS)",
        sampling_rate: "4 Hz",
        sensor_type: "Electrodermal sensor",
    },
    SensorDef {
        name: "wrist_hr",
        columns: &["timestamp", "hr"],
        description: "Wrist heart rate (trailing 10-second average)",
        units: "bpm",
        sampling_rate: "1 Hz",
        sensor_type: "Heart rate sensor",
    },
    SensorDef {
        name: "wrist_ibi",
        columns: &["timestamp", "duration"],
        description: "Inter-beat interval",
        units: "ms",
        sampling_rate: "per detected beat",
        sensor_type: "Heartbeat detection",
    },
    SensorDef {
        name: "wrist_skin_temperature",
        columns: &["timestamp", "temp"],
        description: "Wrist skin temperature",
        units: "degC",
        sampling_rate: "4 Hz",
        sensor_type: "Temperature sensor",
    },
];

/// Catalog keyed by sensor identifier, ordered by name
pub static CATALOG: Lazy<BTreeMap<&'static str, SensorDef>> =
    Lazy::new(|| DEFS.iter().map(|def| (def.name, *def)).collect());

/// Look up a sensor definition by identifier
pub fn lookup(name: &str) -> Option<&'static SensorDef> {
    CATALOG.get(name)
}

/// All known sensor identifiers in catalog order
pub fn sensor_names() -> impl Iterator<Item = &'static str> {
    CATALOG.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_all_device_families() {
        assert_eq!(CATALOG.len(), 34);
        for prefix in ["ear_", "forehead_", "muse_", "chest_", "zephyr_", "wrist_"] {
            assert!(
                sensor_names().any(|n| n.starts_with(prefix)),
                "missing family: {}",
                prefix
            );
        }
    }

    #[test]
    fn every_sensor_starts_with_timestamp() {
        for def in CATALOG.values() {
            assert_eq!(def.columns[0], "timestamp", "sensor: {}", def.name);
            assert!(!def.description.is_empty());
            assert!(!def.units.is_empty());
        }
    }

    #[test]
    fn lookup_known_and_unknown() {
        let hr = lookup("wrist_hr").expect("wrist_hr should exist");
        assert_eq!(hr.columns, &["timestamp", "hr"]);
        assert_eq!(hr.sampling_rate, "1 Hz");
        assert!(lookup("wrist_unknown").is_none());
    }

    #[test]
    fn column_type_rule() {
        assert_eq!(column_sql_type("timestamp"), "REAL");
        assert_eq!(column_sql_type("is_blink"), "INTEGER");
        assert_eq!(column_sql_type("TP9"), "INTEGER");
        assert_eq!(column_sql_type("worn_confidence"), "INTEGER");
        assert_eq!(column_sql_type("ax"), "REAL");
        assert_eq!(column_sql_type("hr"), "REAL");
    }
}
