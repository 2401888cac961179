mod common;

use common::{flt, gen_at, one_of_each, sample_callsigns, Lcg};
use flt2vhs_core::flt::catalog::{PayloadLen, HEADER_LEN};
use flt2vhs_core::flt::{Record, RecordReader, RecordType};
use flt2vhs_core::{ConversionError, FlightModel};

fn read_all(bytes: &[u8]) -> (Vec<Record<'_>>, Option<ConversionError>) {
    let mut ok = Vec::new();
    for r in RecordReader::new(bytes) {
        match r {
            Ok(r) => ok.push(r),
            Err(e) => return (ok, Some(e)),
        }
    }
    (ok, None)
}

#[test]
fn every_type_decodes_to_what_was_encoded() {
    let cs = sample_callsigns();
    let records = one_of_each(&cs);
    assert_eq!(records.len(), RecordType::COUNT);

    for (tag, r) in records.iter().enumerate() {
        assert_eq!(r.record_type().tag() as usize, tag);

        let mut bytes = Vec::new();
        r.encode(&mut bytes);
        assert_eq!(bytes.len(), r.encoded_len(), "{}", r.record_type().name());

        let (back, err) = read_all(&bytes);
        assert!(err.is_none(), "{}: {:?}", r.record_type().name(), err);
        assert_eq!(back, vec![*r]);
    }
}

#[test]
fn fixed_payload_sizes_match_the_wire_table() {
    let expect = [32, 32, 44, 36, 24, 24, 44, 20, 20, 32, 32, 0, 12];
    for (ty, n) in RecordType::ALL.iter().zip(expect) {
        assert_eq!(ty.payload_len(), PayloadLen::Fixed(n), "{}", ty.name());
    }
    assert_eq!(
        RecordType::CallsignList.payload_len(),
        PayloadLen::Counted {
            prefix: 4,
            element: 20
        }
    );
    assert_eq!(RecordType::from_tag(14), None);
}

#[test]
fn callsign_list_is_a_borrowed_view() {
    let cs = sample_callsigns();
    let records = one_of_each(&cs);
    let bytes = flt(&records);
    let (back, _) = read_all(&bytes);

    let list = match back[13].body {
        flt2vhs_core::flt::RecordBody::CallsignList(list) => list,
        other => panic!("expected callsign list, got {other:?}"),
    };
    assert_eq!(list.len(), 3);
    let labels: Vec<String> = list.iter().map(|c| c.label_text()).collect();
    assert_eq!(labels, ["Viper 1-1", "Cowboy 2-1", "a label much lon"]);
    let team: Vec<i32> = list.iter().map(|c| c.team_color).collect();
    assert_eq!(team, [1, 2, 3]);

    // The entries point into the input buffer.
    let base = bytes.as_ptr() as usize;
    let at = list.raw().as_ptr() as usize;
    assert!(at > base && at < base + bytes.len());
}

#[test]
fn n_records_read_back_as_n_in_order() {
    let mut rng = Lcg::new(0x5eed);
    let records: Vec<Record<'static>> = (0..500)
        .map(|_| gen_at(rng.f32(), rng.below(40) as i32))
        .collect();
    let bytes = flt(&records);

    let (back, err) = read_all(&bytes);
    assert!(err.is_none());
    assert_eq!(back, records);
}

#[test]
fn empty_input_yields_nothing() {
    let (back, err) = read_all(&[]);
    assert!(back.is_empty());
    assert!(err.is_none());
}

#[test]
fn truncation_at_every_cut_point_keeps_the_prefix() {
    let cs = sample_callsigns();
    let all = one_of_each(&cs);

    for last in &all {
        let payload = last.encoded_len() - HEADER_LEN;
        if payload == 0 {
            continue;
        }
        let head: Vec<Record<'_>> = all
            .iter()
            .filter(|r| r.record_type() != last.record_type())
            .copied()
            .collect();
        let prefix = flt(&head);
        let mut full = prefix.clone();
        last.encode(&mut full);

        for cut in 1..payload {
            let bytes = &full[..full.len() - cut];
            let (back, err) = read_all(bytes);
            assert_eq!(back, head, "{} cut {}", last.record_type().name(), cut);
            match err {
                Some(ConversionError::TruncatedRecord { offset, .. }) => {
                    assert_eq!(offset, prefix.len())
                }
                other => panic!("{} cut {}: {:?}", last.record_type().name(), cut, other),
            }
        }
    }
}

#[test]
fn a_partial_header_is_truncation() {
    let mut bytes = flt(&[gen_at(1.0, 1)]);
    bytes.extend_from_slice(&[0, 0, 0]);
    let (back, err) = read_all(&bytes);
    assert_eq!(back.len(), 1);
    assert!(err.map(|e| e.is_truncation()).unwrap_or(false));
}

#[test]
fn truncated_model_keeps_what_was_parsed() {
    let mut bytes = flt(&[gen_at(1.0, 1), gen_at(2.0, 2)]);
    let cut = bytes.len() - 10;
    bytes.truncate(cut);

    let model = FlightModel::ingest(&bytes).unwrap();
    assert_eq!(model.counts.total(), 1);
    let t = model.truncation.unwrap();
    assert_eq!(t.offset, HEADER_LEN + 32);
    assert_eq!(t.needed, HEADER_LEN + 32);
    assert_eq!(t.skipped, HEADER_LEN + 32 - 10);
}

#[test]
fn unknown_tag_is_fatal_with_offset() {
    let mut bytes = flt(&[gen_at(1.0, 1)]);
    let at = bytes.len();
    bytes.extend_from_slice(&[14, 0, 0, 0, 0]);
    bytes.extend(flt(&[gen_at(2.0, 2)]));

    let (back, err) = read_all(&bytes);
    assert_eq!(back.len(), 1);
    match err {
        Some(ConversionError::UnknownRecordType { offset, tag }) => {
            assert_eq!(offset, at);
            assert_eq!(tag, 14);
        }
        other => panic!("unexpected {other:?}"),
    }

    let err = FlightModel::ingest(&bytes).unwrap_err();
    assert!(matches!(err, ConversionError::UnknownRecordType { tag: 14, .. }));
}

#[test]
fn reader_stops_after_the_first_error() {
    let bytes = [0xFFu8, 1, 2, 3, 4, 5, 6, 7];
    let mut reader = RecordReader::new(&bytes);
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
    assert!(reader.next().is_none());
}

#[test]
fn negative_callsign_count_is_fatal() {
    let mut bytes = vec![RecordType::CallsignList.tag()];
    bytes.extend_from_slice(&0.0f32.to_le_bytes());
    bytes.extend_from_slice(&(-1i32).to_le_bytes());
    bytes.extend_from_slice(&[0u8; 40]);

    let err = FlightModel::ingest(&bytes).unwrap_err();
    match err {
        ConversionError::InvalidCallsignCount { offset, count } => {
            assert_eq!(offset, 0);
            assert_eq!(count, -1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn callsign_count_past_the_end_is_truncation() {
    let mut bytes = vec![RecordType::CallsignList.tag()];
    bytes.extend_from_slice(&0.0f32.to_le_bytes());
    bytes.extend_from_slice(&1000i32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 20]);

    let (back, err) = read_all(&bytes);
    assert!(back.is_empty());
    match err {
        Some(ConversionError::TruncatedRecord { needed, available, .. }) => {
            assert_eq!(needed, HEADER_LEN + 4 + 1000 * 20);
            assert_eq!(available, bytes.len());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn nan_fields_pass_through() {
    let r = gen_at(f32::NAN, 9);
    let bytes = flt(&[r]);
    let (back, err) = read_all(&bytes);
    assert!(err.is_none());
    assert!(back[0].time.is_nan());
}
