use std::path::Path;

use yojana_storage::{Error, SchemeDetail, SchemeStore, split};
use yojana_testkit::{TempTables, detail, master, sample_store, sample_tables};

#[test]
fn loads_tables_from_disk() {
	let (master_rows, detail_rows) = sample_tables();
	let tables = TempTables::write(&master_rows, &detail_rows).expect("Failed to write tables.");
	let store = SchemeStore::load(&tables.master_path, &tables.details_path)
		.expect("Failed to load tables.");

	assert_eq!(store.master(), master_rows.as_slice());
	assert_eq!(store.details(), detail_rows.as_slice());
	assert_eq!(store.name_by_id(3), Some("Udyogini"));
}

#[test]
fn missing_table_is_a_read_error() {
	let err = SchemeStore::load(
		Path::new("/nonexistent/yojana/scheme_master.json"),
		Path::new("/nonexistent/yojana/scheme_details.json"),
	)
	.expect_err("Expected a read error.");

	assert!(matches!(err, Error::Read { .. }), "Unexpected error: {err}");
}

#[test]
fn malformed_table_is_a_parse_error() {
	let tables = TempTables::write_raw("[{\"scheme_id\": 1, \"scheme_name\": \"A\"}]", "{not json")
		.expect("Failed to write tables.");
	let err = SchemeStore::load(&tables.master_path, &tables.details_path)
		.expect_err("Expected a parse error.");

	match err {
		Error::Parse { path, .. } => assert_eq!(path, tables.details_path),
		other => panic!("Unexpected error: {other}"),
	}
}

#[test]
fn detail_lookup_returns_first_match_or_none() {
	let store = SchemeStore::from_tables(
		vec![master(7, "Seven")],
		vec![
			SchemeDetail { objective: Some("first".to_string()), ..detail(7) },
			SchemeDetail { objective: Some("second".to_string()), ..detail(7) },
		],
	);

	assert_eq!(store.detail_by_id(7).map(SchemeDetail::objective_text), Some("first"));
	assert!(store.detail_by_id(8).is_none());
}

#[test]
fn empty_master_name_counts_as_absent() {
	let store = SchemeStore::from_tables(vec![master(1, "")], vec![detail(1)]);

	assert_eq!(store.name_by_id(1), None);
	assert_eq!(store.joined().len(), 1);
}

#[test]
fn joined_is_an_inner_join_in_master_order() {
	let store = sample_store();
	let joined = store.joined();
	let joined_ids = joined.iter().map(|row| row.detail.scheme_id).collect::<Vec<_>>();

	assert_eq!(joined_ids, vec![1, 2, 3, 4, 5]);

	for entry in store.master() {
		assert_eq!(
			joined_ids.contains(&entry.scheme_id),
			store.detail_by_id(entry.scheme_id).is_some(),
			"Join membership mismatch for scheme {}.",
			entry.scheme_id
		);
	}

	assert!(!joined_ids.contains(&99), "Details without a master row must not be joined.");
	assert_eq!(joined[1].scheme_name, "Lakshya Scheme");
}

#[test]
fn split_output_loads_as_a_store() {
	let records = serde_json::from_value(serde_json::json!([
		{ "scheme_name": "Farmer Aid", "objective": "helps farmers", "eligibility": ["farmer"] },
		{ "scheme_name": "Widow Pension", "tags": null, "source_url": "https://example.gov.in/wp" }
	]))
	.expect("Failed to parse flat records.");
	let (master_rows, detail_rows) = split::split_flat(records);
	let tables = TempTables::write_raw("[]", "[]").expect("Failed to create table dir.");

	split::write_tables(&master_rows, &detail_rows, &tables.master_path, &tables.details_path)
		.expect("Failed to write split tables.");

	let store = SchemeStore::load(&tables.master_path, &tables.details_path)
		.expect("Failed to load split tables.");

	assert_eq!(store.name_by_id(2), Some("Widow Pension"));
	assert_eq!(
		store.detail_by_id(2).and_then(|detail| detail.source_url.as_deref()),
		Some("https://example.gov.in/wp")
	);
	assert_eq!(store.joined().len(), 2);
}
