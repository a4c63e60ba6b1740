use qrx_decoder::{format_bytes, format_duration, format_speed};

#[test]
fn test_bytes_below_one_kilobyte_are_exact() {
    assert_eq!(format_bytes(0), "0 B");
    assert_eq!(format_bytes(66), "66 B");
    assert_eq!(format_bytes(999), "999 B");
}

#[test]
fn test_bytes_scale_through_units() {
    assert_eq!(format_bytes(1500), "1.5 KB");
    assert_eq!(format_bytes(2_000_000), "2.0 MB");
    assert_eq!(format_bytes(3_400_000_000), "3.4 GB");
}

#[test]
fn test_speed_handles_zero_elapsed() {
    assert_eq!(format_speed(5000, 0), "0 B/s");
    assert_eq!(format_speed(3000, 2000), "1.5 KB/s");
    assert_eq!(format_speed(100, 1000), "100 B/s");
}

#[test]
fn test_durations_are_humanized() {
    assert_eq!(format_duration(4200), "4s 200ms");
    assert_eq!(format_duration(0), "0s");
}
