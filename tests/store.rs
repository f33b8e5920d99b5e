use barber_booking::{
    AppointmentPatch, BookingError, DeleteOutcome, NewCustomer, Store, UpdateOutcome,
};
use rusqlite::Connection;
use tempfile::TempDir;

/// Fresh store inside its own temporary directory. The directory is removed
/// when the returned guard drops.
fn setup_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Store::at(dir.path().join("data").join("appointments.sqlite"));
    store.ensure_schema().expect("Failed to create schema");
    (dir, store)
}

fn customer(username: &str) -> NewCustomer {
    NewCustomer {
        username: username.to_string(),
        password: "s3cret".to_string(),
        email: Some(format!("{username}@example.com")),
        phone: None,
    }
}

#[test]
fn test_added_appointment_is_listed_in_display_form() {
    let (_dir, store) = setup_store();

    let created = store
        .add_appointment("Ayşe", "15-06-2024", "14:30", None)
        .unwrap();
    assert_eq!(created.date, "15-06-2024");

    let all = store.list_appointments().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, created.id);
    assert_eq!(all[0].customer_name, "Ayşe");
    assert_eq!(all[0].date, "15-06-2024");
    assert_eq!(all[0].time, "14:30");
    assert_eq!(all[0].barber_name, None);
}

#[test]
fn test_dates_are_stored_year_first() {
    let (_dir, store) = setup_store();
    store
        .add_appointment("Ali", "01-12-2024", "09:00", Some("Mehmet"))
        .unwrap();

    let conn = Connection::open(store.path()).unwrap();
    let raw: String = conn
        .query_row("SELECT date FROM appointments", [], |row| row.get(0))
        .unwrap();
    assert_eq!(raw, "2024-12-01");
}

#[test]
fn test_invalid_dates_are_rejected_without_writing() {
    let (_dir, store) = setup_store();

    for bad in ["31-02-2024", "2024-06-15", "15/06/2024", "5-6-2024", ""] {
        let err = store
            .add_appointment("Ali", bad, "10:00", None)
            .unwrap_err();
        assert!(
            matches!(err, BookingError::InvalidDate { .. }),
            "{bad:?} gave {err:?}"
        );
    }
    assert!(store.list_appointments().unwrap().is_empty());
}

#[test]
fn test_blank_name_or_time_is_refused() {
    let (_dir, store) = setup_store();

    let err = store
        .add_appointment("   ", "15-06-2024", "10:00", None)
        .unwrap_err();
    assert!(matches!(err, BookingError::MissingField(_)));

    let err = store
        .add_appointment("Ali", "15-06-2024", " ", None)
        .unwrap_err();
    assert!(matches!(err, BookingError::MissingField(_)));
}

#[test]
fn test_listing_is_chronological() {
    let (_dir, store) = setup_store();
    store.add_appointment("Late", "02-01-2025", "09:00", None).unwrap();
    store.add_appointment("Early", "31-12-2024", "18:00", None).unwrap();
    store.add_appointment("Noon", "31-12-2024", "12:00", None).unwrap();

    let names: Vec<_> = store
        .list_appointments()
        .unwrap()
        .into_iter()
        .map(|a| a.customer_name)
        .collect();
    assert_eq!(names, ["Noon", "Early", "Late"]);
}

#[test]
fn test_list_on_date_filters_and_validates() {
    let (_dir, store) = setup_store();
    store.add_appointment("Ali", "15-06-2024", "11:00", None).unwrap();
    store.add_appointment("Veli", "15-06-2024", "10:00", None).unwrap();
    store.add_appointment("Can", "16-06-2024", "10:00", None).unwrap();

    let day = store.list_appointments_on("15-06-2024").unwrap();
    let names: Vec<_> = day.iter().map(|a| a.customer_name.as_str()).collect();
    assert_eq!(names, ["Veli", "Ali"]);

    assert!(store.list_appointments_on("17-06-2024").unwrap().is_empty());
    assert!(matches!(
        store.list_appointments_on("30-02-2024"),
        Err(BookingError::InvalidDate { .. })
    ));
}

#[test]
fn test_search_ignores_case_and_treats_wildcards_literally() {
    let (_dir, store) = setup_store();
    store.add_appointment("Mehmet Kaya", "15-06-2024", "10:00", None).unwrap();
    store.add_appointment("Ahmet", "15-06-2024", "11:00", None).unwrap();
    store.add_appointment("100% Ali", "15-06-2024", "12:00", None).unwrap();

    let hits = store.search_appointments("MET").unwrap();
    assert_eq!(hits.len(), 2);

    let hits = store.search_appointments("kaya").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].customer_name, "Mehmet Kaya");

    let hits = store.search_appointments("%").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].customer_name, "100% Ali");

    assert!(store.search_appointments("zzz").unwrap().is_empty());
}

#[test]
fn test_lookup_treats_numbers_as_ids() {
    let (_dir, store) = setup_store();
    let first = store.add_appointment("Ali", "15-06-2024", "10:00", None).unwrap();
    store.add_appointment("Veli", "15-06-2024", "11:00", None).unwrap();

    let hits = store.lookup_appointments(&first.id.to_string()).unwrap();
    assert_eq!(hits, vec![first]);
    assert!(store.lookup_appointments("9999").unwrap().is_empty());
    assert_eq!(store.lookup_appointments("vel").unwrap().len(), 1);
}

#[test]
fn test_partial_update_keeps_other_fields() {
    let (_dir, store) = setup_store();
    let created = store
        .add_appointment("Ayşe", "15-06-2024", "14:30", Some("Mehmet"))
        .unwrap();

    let patch = AppointmentPatch::from_inputs("", "16-06-2024", "", "");
    assert_eq!(
        store.update_appointment(created.id, patch).unwrap(),
        UpdateOutcome::Updated
    );

    let updated = store.find_appointment(created.id).unwrap().unwrap();
    assert_eq!(updated.customer_name, "Ayşe");
    assert_eq!(updated.date, "16-06-2024");
    assert_eq!(updated.time, "14:30");
    assert_eq!(updated.barber_name.as_deref(), Some("Mehmet"));
}

#[test]
fn test_update_outcomes() {
    let (_dir, store) = setup_store();
    let created = store.add_appointment("Ali", "15-06-2024", "10:00", None).unwrap();

    let patch = AppointmentPatch::from_inputs("Veli", "", "", "");
    assert_eq!(
        store.update_appointment(9999, patch).unwrap(),
        UpdateOutcome::NotFound
    );

    let blank = AppointmentPatch::from_inputs(" ", "", "\t", "");
    assert_eq!(
        store.update_appointment(created.id, blank).unwrap(),
        UpdateOutcome::NoFields
    );
}

#[test]
fn test_update_with_bad_date_writes_nothing() {
    let (_dir, store) = setup_store();
    let created = store.add_appointment("Ali", "15-06-2024", "10:00", None).unwrap();

    let patch = AppointmentPatch::from_inputs("Veli", "31-02-2024", "", "");
    assert!(matches!(
        store.update_appointment(created.id, patch),
        Err(BookingError::InvalidDate { .. })
    ));

    let unchanged = store.find_appointment(created.id).unwrap().unwrap();
    assert_eq!(unchanged, created);
}

#[test]
fn test_delete_twice() {
    let (_dir, store) = setup_store();
    let created = store.add_appointment("Ali", "15-06-2024", "10:00", None).unwrap();

    assert_eq!(
        store.delete_appointment(created.id).unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        store.delete_appointment(created.id).unwrap(),
        DeleteOutcome::NotFound
    );
    assert!(store.list_appointments().unwrap().is_empty());
}

#[test]
fn test_schema_setup_is_idempotent() {
    let (_dir, store) = setup_store();
    store.add_appointment("Ali", "15-06-2024", "10:00", None).unwrap();

    store.ensure_schema().unwrap();
    store.ensure_schema().unwrap();

    assert_eq!(store.list_appointments().unwrap().len(), 1);
}

#[test]
fn test_malformed_stored_date_is_shown_raw() {
    let (_dir, store) = setup_store();
    let conn = Connection::open(store.path()).unwrap();
    conn.execute(
        "INSERT INTO appointments (customer_name, date, time) VALUES ('Legacy', 'someday', '10:00')",
        [],
    )
    .unwrap();

    let all = store.list_appointments().unwrap();
    assert_eq!(all[0].date, "someday");
}

#[test]
fn test_duplicate_service_keeps_first_row() {
    let (_dir, store) = setup_store();
    store.add_service("Saç Kesimi", 200.0, 30).unwrap();

    let err = store.add_service("Saç Kesimi", 250.0, 45).unwrap_err();
    assert!(matches!(err, BookingError::Duplicate { entity: "Service", .. }));

    let services = store.list_services().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].price, 200.0);
    assert_eq!(services[0].duration_minutes, 30);
}

#[test]
fn test_service_price_and_duration_must_be_positive() {
    let (_dir, store) = setup_store();
    assert!(matches!(
        store.add_service("Sakal", 0.0, 20),
        Err(BookingError::NotPositive("Price"))
    ));
    assert!(matches!(
        store.add_service("Sakal", 100.0, 0),
        Err(BookingError::NotPositive("Duration"))
    ));
    assert!(store.list_services().unwrap().is_empty());
}

#[test]
fn test_customer_passwords_are_hashed_and_verified() {
    let (dir, store) = setup_store();
    let created = store.add_customer(&customer("ayse")).unwrap();
    assert_eq!(created.email.as_deref(), Some("ayse@example.com"));

    let conn = Connection::open(dir.path().join("data").join("appointments.sqlite")).unwrap();
    let stored: String = conn
        .query_row("SELECT password_hash FROM customers", [], |row| row.get(0))
        .unwrap();
    assert_ne!(stored, "s3cret");

    let verified = store.verify_customer("ayse", "s3cret").unwrap();
    assert_eq!(verified, Some(created));
    assert_eq!(store.verify_customer("ayse", "wrong").unwrap(), None);
    assert_eq!(store.verify_customer("nobody", "s3cret").unwrap(), None);
}

#[test]
fn test_duplicate_username_is_refused() {
    let (_dir, store) = setup_store();
    store.add_customer(&customer("ayse")).unwrap();

    let err = store.add_customer(&customer("ayse")).unwrap_err();
    assert!(matches!(err, BookingError::Duplicate { entity: "Customer", .. }));
    assert_eq!(store.list_customers().unwrap().len(), 1);
}

#[test]
fn test_bookings_join_names_and_sort_by_slot() {
    let (_dir, store) = setup_store();
    let ayse = store.add_customer(&customer("ayse")).unwrap();
    let ali = store.add_customer(&customer("ali")).unwrap();
    let barber = store.add_barber("Mehmet Usta", "Fade").unwrap();
    let cut = store.add_service("Saç Kesimi", 200.0, 30).unwrap();
    let shave = store.add_service("Sakal", 120.0, 20).unwrap();

    let later = store
        .create_booking(ayse.id, barber.id, cut.id, "16-06-2024", "10:00")
        .unwrap();
    assert_eq!(later.status, "scheduled");
    store
        .create_booking(ali.id, barber.id, shave.id, "15-06-2024", "17:00")
        .unwrap();

    let bookings = store.list_bookings().unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0].customer, "ali");
    assert_eq!(bookings[0].service, "Sakal");
    assert_eq!(bookings[0].date, "15-06-2024");
    assert_eq!(bookings[1].customer, "ayse");
    assert_eq!(bookings[1].barber, "Mehmet Usta");
    assert_eq!(bookings[1].price, 200.0);
    assert_eq!(bookings[1].duration_minutes, 30);
}

#[test]
fn test_booking_with_unknown_ids_is_refused() {
    let (_dir, store) = setup_store();
    let ayse = store.add_customer(&customer("ayse")).unwrap();
    let cut = store.add_service("Saç Kesimi", 200.0, 30).unwrap();

    let err = store
        .create_booking(ayse.id, 42, cut.id, "15-06-2024", "10:00")
        .unwrap_err();
    assert!(matches!(err, BookingError::MissingReference));
    assert!(store.list_bookings().unwrap().is_empty());
}

#[test]
fn test_booking_status_and_delete() {
    let (_dir, store) = setup_store();
    let ayse = store.add_customer(&customer("ayse")).unwrap();
    let barber = store.add_barber("Mehmet Usta", "").unwrap();
    let cut = store.add_service("Saç Kesimi", 200.0, 30).unwrap();
    let booking = store
        .create_booking(ayse.id, barber.id, cut.id, "15-06-2024", "10:00")
        .unwrap();

    assert_eq!(
        store.set_booking_status(booking.id, "done").unwrap(),
        UpdateOutcome::Updated
    );
    assert_eq!(
        store.set_booking_status(booking.id, "  ").unwrap(),
        UpdateOutcome::NoFields
    );
    assert_eq!(
        store.set_booking_status(999, "done").unwrap(),
        UpdateOutcome::NotFound
    );
    assert_eq!(store.list_bookings().unwrap()[0].status, "done");

    assert_eq!(store.delete_booking(booking.id).unwrap(), DeleteOutcome::Deleted);
    assert_eq!(store.delete_booking(booking.id).unwrap(), DeleteOutcome::NotFound);
}
