//! Unit tests for ID translation

use super::*;

#[test]
fn test_indices_follow_first_sight() {
    let mut table = IdTranslation::new();
    assert!(table.is_empty());

    assert_eq!(table.translate(0xdead_beef), 0);
    assert_eq!(table.translate(42), 1);
    assert_eq!(table.translate(0xdead_beef), 0);
    assert_eq!(table.translate(7), 2);

    assert_eq!(table.len(), 3);
    assert_eq!(table.get(42), Some(1));
    assert_eq!(table.get(43), None);
}

#[test]
fn test_global_table_is_stable() {
    // Other tests may share the table, so only relative properties hold
    let first = translated_hash(0x0123_4567_89ab_cdef);
    let second = translated_hash(0xfedc_ba98_7654_3210);

    assert_ne!(first, second);
    assert_eq!(translated_hash(0x0123_4567_89ab_cdef), first);
    assert_eq!(translated_hash(0xfedc_ba98_7654_3210), second);
}

#[test]
fn test_global_table_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| translated_hash(0x5151_5151)))
        .collect();
    let indices: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(indices.iter().all(|&index| index == indices[0]));
}
