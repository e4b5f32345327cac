//! Naming and unit conversion tests

use qsan_exporter::qsan::naming::*;
use qsan_exporter::qsan::types::Attributes;
use qsan_exporter::qsan::units::*;

fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_volume_name_format() {
    // Given: Volume attributes with spaces everywhere
    let volume = attrs(&[
        ("name", "qsan ssd3800 2"),
        ("raid", "RAID 10"),
        ("capacity", "10.48 TB"),
    ]);

    // When/Then: Spaces in the name become hyphens, elsewhere they are dropped
    assert_eq!(volume_name(&volume), "qsan-ssd3800-2_RAID10_10.48TB");
}

#[test]
fn test_disk_name_format() {
    let disk = attrs(&[
        ("slot", "7"),
        ("vendor", "SEAGATE"),
        ("model", "ST3840FM0043"),
        ("serial", "Z4Y0A1B2"),
    ]);

    assert_eq!(disk_name(&disk), "Slot_7_SEAGATE_ST3840FM0043_Z4Y0A1B2");
}

#[test]
fn test_disk_name_without_model() {
    // Given: A SANOS 3 disk, which has no model field
    let disk = attrs(&[("slot", "3"), ("vendor", "HGST"), ("serial", "ABC")]);

    // Then: The model segment is empty but present
    assert_eq!(disk_name(&disk), "Slot_3_HGST__ABC");
}

#[test]
fn test_disk_name_replaces_spaces_in_model() {
    let disk = attrs(&[
        ("slot", "1"),
        ("vendor", "WD"),
        ("model", "Ultrastar DC HC550"),
        ("serial", "X"),
    ]);

    assert_eq!(disk_name(&disk), "Slot_1_WD_Ultrastar-DC-HC550_X");
}

#[test]
fn test_fc_port_name_format() {
    let port = attrs(&[("name", "FC 3"), ("speed", "16Gb")]);

    assert_eq!(fc_port_name("1:2", &port, "name"), "CTRL1_FC3");
}

#[test]
fn test_fc_port_index_is_zero_based() {
    // Given: SANOS 4 (`FC3`) and SANOS 3 (`Port 3`) names for port 3
    // Then: Both yield index 2
    assert_eq!(fc_port_index("FC3", 2), Some(2));
    assert_eq!(fc_port_index("Port 3", 5), Some(2));
    assert_eq!(fc_port_key(1, 2), "1:2");
}

#[test]
fn test_fc_port_index_rejects_unreadable_names() {
    assert_eq!(fc_port_index("FC", 2), None);
    assert_eq!(fc_port_index("FCx", 2), None);
    assert_eq!(fc_port_index("FC0", 2), None);
}

#[test]
fn test_cache_pool_key_replaces_spaces() {
    assert_eq!(cache_pool_key("SSD Cache Pool 1"), "SSD-Cache-Pool-1");
}

#[test]
fn test_kib_conversion_is_exact() {
    assert_eq!(kib_to_bytes("100"), Some(102_400));
    assert_eq!(kib_to_bytes("0"), Some(0));
}

#[test]
fn test_mib_conversion_of_fraction() {
    assert_eq!(mib_to_bytes("1.5"), Some(1_572_864));
    assert_eq!(mib_to_bytes("2"), Some(2_097_152));
}

#[test]
fn test_thousands_separators_are_ignored() {
    assert_eq!(parse_counter("10,764"), Some(10_764));
    assert_eq!(kib_to_bytes("1,000"), Some(1_024_000));
}

#[test]
fn test_unreadable_counters() {
    assert_eq!(kib_to_bytes(""), None);
    assert_eq!(kib_to_bytes("n/a"), None);
    assert_eq!(kib_to_bytes("-5"), None);
    assert_eq!(scale(&u64::MAX.to_string(), 2), None);
}

#[test]
fn test_hit_ratio() {
    // Given: 50 hits out of 200 reads
    // Then: round(50 / (200 / 100)) = 25
    assert_eq!(hit_ratio(50, 200), 25);
    assert_eq!(hit_ratio(1, 3), 33);
    assert_eq!(hit_ratio(200, 200), 100);
}

#[test]
fn test_hit_ratio_with_zero_total_is_zero() {
    assert_eq!(hit_ratio(0, 0), 0);
    assert_eq!(hit_ratio(5, 0), 0);
}

#[test]
fn test_hit_ratio_rounds_half_to_even() {
    // 1 / (8 / 100) = 12.5
    assert_eq!(hit_ratio(1, 8), 12);
    // 3 / (8 / 100) = 37.5
    assert_eq!(hit_ratio(3, 8), 38);
}
