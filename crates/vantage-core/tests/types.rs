//! Tests for the shared primitive types

use vantage_core::types::{Address, ProcessId};

#[test]
fn test_process_id_from_u32()
{
    let pid = ProcessId::from(12345);
    assert_eq!(pid.0, 12345);
}

#[test]
fn test_process_id_to_u32()
{
    let pid = ProcessId::from(54321);
    let value: u32 = pid.into();
    assert_eq!(value, 54321);
}

#[test]
fn test_address_round_trip()
{
    let addr = Address::from(0x7fff_0000_1234u64);
    let value: u64 = addr.into();
    assert_eq!(value, 0x7fff_0000_1234);
    assert_eq!(Address::new(42).value(), 42);
}

#[test]
fn test_address_display_is_hex()
{
    assert_eq!(format!("{}", Address::new(0x1000)), "0x1000");
    assert_eq!(format!("{}", Address::ZERO), "0x0");
}

#[test]
fn test_address_arithmetic_wraps()
{
    let addr = Address::new(u64::MAX);
    assert_eq!(addr + 1, Address::ZERO);
    assert_eq!(Address::ZERO - 1, Address::new(u64::MAX));
}

#[test]
fn test_address_ordering()
{
    let low = Address::new(0x1000);
    let high = Address::new(0x2000);
    assert!(low < high);
    assert_eq!(low, Address::new(0x1000));
}
