//! Property tests over the bit cursor, the object map and the page codecs.

mod common;

use std::io::Cursor;

use common::{BitWriter, Drawing};
use dwg_decode::io::dwg::compression::lz77_ac18;
use dwg_decode::io::dwg::reader::bit_reader::DwgBitReader;
use dwg_decode::io::dwg::reader::handle_reader::DwgHandleReader;
use dwg_decode::io::dwg::constants::ac21;
use dwg_decode::{DwgReader, DwgVersion, NotificationCollection, Record, Vector3};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Value {
    Short(i16),
    Long(i32),
    Double(f64),
    Handle(u8, u64),
    Modular(u64),
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i16>().prop_map(Value::Short),
        any::<i32>().prop_map(Value::Long),
        prop_oneof![Just(0.0), Just(1.0), -1e9f64..1e9].prop_map(Value::Double),
        (2u8..=5, any::<u64>()).prop_map(|(c, h)| Value::Handle(c, h)),
        (0u64..1 << 56).prop_map(Value::Modular),
    ]
}

fn write(w: &mut BitWriter, v: &Value) {
    match *v {
        Value::Short(x) => w.bit_short(x),
        Value::Long(x) => w.bit_long(x),
        Value::Double(x) => w.bit_double(x),
        Value::Handle(code, h) => w.handle(code, h),
        Value::Modular(x) => w.bytes(&common::modular_char(x)),
    }
}

fn check(r: &mut DwgBitReader<'_>, v: &Value) -> bool {
    match *v {
        Value::Short(x) => r.read_bit_short() == x,
        Value::Long(x) => r.read_bit_long() == x,
        Value::Double(x) => r.read_bit_double() == x,
        Value::Handle(code, h) => {
            let read = r.read_handle();
            read.code == code && read.handle.value() == h
        }
        Value::Modular(x) => r.read_modular_char() == x,
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn prop_seek_is_idempotent(
        data in proptest::collection::vec(any::<u8>(), 1..64),
        fraction in 0.0f64..=1.0,
    ) {
        let target = (data.len() as f64 * 8.0 * fraction) as i64;
        let mut r = DwgBitReader::new(&data, DwgVersion::AC1018);
        prop_assert!(r.set_position_in_bits(target));
        let first = r.read_bit();
        prop_assert!(r.set_position_in_bits(target));
        prop_assert!(r.set_position_in_bits(target));
        prop_assert_eq!(r.position_in_bits(), target);
        if target < data.len() as i64 * 8 {
            prop_assert_eq!(r.read_bit(), first);
        }
    }

    #[test]
    fn prop_overrun_is_sticky(
        data in proptest::collection::vec(any::<u8>(), 0..16),
        past in 1i64..64,
    ) {
        let mut r = DwgBitReader::new(&data, DwgVersion::AC1015);
        prop_assert!(!r.set_position_in_bits(data.len() as i64 * 8 + past));
        prop_assert!(!r.is_good());
        prop_assert!(!r.set_position_in_bits(0));
        prop_assert!(!r.read_bit());
        prop_assert_eq!(r.read_bit_long(), 0);
        prop_assert!(r.ensure_good("after overrun").is_err());
    }

    #[test]
    fn prop_mixed_stream_reads_back(values in proptest::collection::vec(value(), 1..40)) {
        let mut w = BitWriter::new();
        for v in &values {
            write(&mut w, v);
        }
        let bits = w.len_bits() as i64;
        let bytes = w.into_bytes();
        let mut r = DwgBitReader::new(&bytes, DwgVersion::AC1018);
        for v in &values {
            prop_assert!(check(&mut r, v), "mismatch at {:?}", v);
        }
        prop_assert!(r.is_good());
        prop_assert_eq!(r.position_in_bits(), bits);
    }

    #[test]
    fn prop_object_map_counts(
        handles in proptest::collection::btree_set(1u64..100_000, 1..300),
        per_subsection in 1usize..80,
    ) {
        let entries: Vec<(u64, i64)> = handles
            .iter()
            .enumerate()
            .map(|(i, &h)| (h, (i as i64 * 37) % 5000))
            .collect();
        let bytes = common::handles_section(&entries, per_subsection);
        let mut notes = NotificationCollection::new();
        let map = DwgHandleReader::new(DwgVersion::AC1018, &bytes).read(&mut notes).unwrap();

        prop_assert_eq!(map.total(), entries.len());
        prop_assert_eq!(map.len(), entries.len());
        prop_assert_eq!(map.subsection_counts().iter().sum::<usize>(), entries.len());
        prop_assert_eq!(map.subsection_counts().len(), entries.len().div_ceil(per_subsection));
        for &(h, location) in &entries {
            prop_assert_eq!(map.location(h), Some(location));
        }
        prop_assert!(notes.is_empty());
    }

    #[test]
    fn prop_ac18_literal_run(data in proptest::collection::vec(any::<u8>(), 4..2000)) {
        let stream = common::lz77_ac18_literal(&data);
        prop_assert_eq!(lz77_ac18::decompress(&stream, data.len()).unwrap(), data);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 16, .. ProptestConfig::default() })]

    #[test]
    fn prop_ac21_file_survives_page_noise(offset in 0usize..255, flip in 1u8..=255) {
        let start = Vector3::new(3.0, 4.0, 0.0);
        let end = Vector3::new(-3.0, 8.0, 0.0);
        let mut bytes = Drawing::single_line(DwgVersion::AC1021, start, end).build();
        // One symbol of the header page.
        bytes[ac21::DATA_PAGE_BASE_OFFSET as usize + offset] ^= flip;

        let mut reader = DwgReader::from_reader(Cursor::new(bytes)).unwrap();
        let records = reader.read_records().unwrap();
        let Some(Record::Line(line)) = records.entities.first() else {
            return Err(TestCaseError::fail("line lost"));
        };
        prop_assert_eq!(line.start, start);
        prop_assert_eq!(line.end, end);
    }
}
