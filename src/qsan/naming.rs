//! Display names for discovered entities
//!
//! Names end up inside monitoring item keys, so they must be deterministic and must
//! never contain whitespace.

use crate::qsan::types::Attributes;

fn field<'a>(attrs: &'a Attributes, name: &str) -> &'a str {
    attrs.get(name).map(String::as_str).unwrap_or_default()
}

/// Replaces every whitespace character in `value` with `with`.
fn squash(value: &str, with: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_whitespace() {
            out.push_str(with);
        } else {
            out.push(c);
        }
    }
    out
}

/// `<name>_<raid>_<capacity>`, e.g. `qsan-ssd3800-2_RAID10_10.48TB`
pub fn volume_name(attrs: &Attributes) -> String {
    [
        squash(field(attrs, "name"), "-"),
        squash(field(attrs, "raid"), ""),
        squash(field(attrs, "capacity"), ""),
    ]
    .join("_")
}

/// `Slot_<slot>_<vendor>_<model>_<serial>`, e.g. `Slot_7_SEAGATE_ST3840FM0043_Z4Y0A1B2`.
/// SANOS 3 disks have no model; the segment is then left empty.
pub fn disk_name(attrs: &Attributes) -> String {
    let name = [
        "Slot",
        field(attrs, "slot"),
        field(attrs, "vendor"),
        field(attrs, "model"),
        field(attrs, "serial"),
    ]
    .join("_");
    squash(&name, "-")
}

/// `CTRL<controller>_<port name>`, e.g. `CTRL1_FC3`
pub fn fc_port_name(key: &str, attrs: &Attributes, name_field: &str) -> String {
    let controller = key.split(':').next().unwrap_or_default();
    format!(
        "CTRL{}_{}",
        squash(controller, ""),
        squash(field(attrs, name_field), "")
    )
}

/// Cache pools are keyed by their display name with spaces turned into hyphens.
pub fn cache_pool_key(display_name: &str) -> String {
    display_name.replace(' ', "-")
}

/// Zero-based port index from a textual port name such as `FC3` or `Port 3`,
/// after dropping `prefix_len` leading characters.
pub fn fc_port_index(port_name: &str, prefix_len: usize) -> Option<u32> {
    let number: String = port_name.chars().skip(prefix_len).collect();
    number.trim().parse::<u32>().ok()?.checked_sub(1)
}

/// Composite FC port key, `controller:port`.
pub fn fc_port_key(controller: u8, port_index: u32) -> String {
    format!("{}:{}", controller, port_index)
}
