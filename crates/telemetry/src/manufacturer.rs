//! Cell vendor lookup and serial masking.

#![forbid(unsafe_code)]

/// Serial prefix to cell vendor.
const VENDORS: &[(&str, &str)] = &[
    ("F8Y", "Sunwoda"),
    ("SWD", "Sunwoda"),
    ("F5D", "Desay"),
    ("DTP", "Desay"),
    ("DSY", "Desay"),
    ("FG9", "Simplo"),
    ("SMP", "Simplo"),
    ("ATL", "ATL"),
    ("LGC", "LG"),
    ("SON", "Sony"),
];

const PREFIX_LEN: usize = 3;
const SUFFIX_LEN: usize = 3;

fn prefix(serial: &str) -> &str {
    let end = serial
        .char_indices()
        .nth(PREFIX_LEN)
        .map_or(serial.len(), |(idx, _)| idx);
    &serial[..end]
}

/// Look up the cell vendor from the first three characters of the serial.
///
/// ```
/// # use telemetry::manufacturer::manufacturer;
/// assert_eq!(manufacturer("F8Y1234ABCD"), Some("Sunwoda"));
/// assert_eq!(manufacturer("XYZ1234"), None);
/// ```
pub fn manufacturer(serial: &str) -> Option<&'static str> {
    let prefix = prefix(serial);
    VENDORS
        .iter()
        .find(|(known, _)| *known == prefix)
        .map(|(_, vendor)| *vendor)
}

/// Hide the middle of a serial, keeping the vendor prefix and the last three
/// characters. Short serials only keep the prefix.
pub fn mask_serial(serial: &str) -> String {
    let chars: Vec<char> = serial.chars().collect();
    let len = chars.len();
    let keep_tail = if len > PREFIX_LEN + SUFFIX_LEN { SUFFIX_LEN } else { 0 };
    let keep_head = len.min(PREFIX_LEN);

    chars
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            if idx < keep_head || idx >= len - keep_tail {
                *c
            } else {
                '*'
            }
        })
        .collect()
}
