use std::io::Cursor;

use barber_booking::{run_menu, Store};
use tempfile::TempDir;

fn setup_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Store::at(dir.path().join("menu.sqlite"));
    store.ensure_schema().expect("Failed to create schema");
    (dir, store)
}

/// Feed `script` to the menu line by line and return everything it printed.
fn run_script(store: &Store, script: &[&str]) -> String {
    let mut input = script.join("\n");
    input.push('\n');
    let mut output = Vec::new();
    run_menu(store, Cursor::new(input), &mut output).expect("menu session failed");
    String::from_utf8(output).expect("menu printed invalid UTF-8")
}

#[test]
fn test_add_list_and_delete_session() {
    let (_dir, store) = setup_store();

    let output = run_script(
        &store,
        &[
            "1", "Ayşe", "15-06-2024", "14:30", "", // add
            "2", // list all
            "6", "1", // delete
            "6", "1", // delete again
            "2", // list all
            "0",
        ],
    );

    assert!(output.contains("Appointment #1 booked for Ayşe on 15-06-2024 at 14:30."));
    assert!(output.contains("#1 Ayşe on 15-06-2024 at 14:30 (Unassigned)"));
    assert!(output.contains("Appointment #1 deleted."));
    assert!(output.contains("Appointment #1 not found."));
    assert!(output.contains("No appointments yet."));
    assert!(output.trim_end().ends_with("Goodbye."));
    assert!(store.list_appointments().unwrap().is_empty());
}

#[test]
fn test_invalid_input_is_reported_and_the_loop_continues() {
    let (_dir, store) = setup_store();

    let output = run_script(
        &store,
        &[
            "1", "Ali", "31-02-2024", "10:00", "",
            "3", "2024-06-15",
            "5", "abc",
            "42",
            "4", "",
            "0",
        ],
    );

    assert!(output.contains("Error: Invalid date '31-02-2024'. Use the DD-MM-YYYY format."));
    assert!(output.contains("Error: Invalid date '2024-06-15'. Use the DD-MM-YYYY format."));
    assert!(output.contains("Invalid id. Please enter a number."));
    assert!(output.contains("Unknown option, try again."));
    assert!(output.contains("Enter something to search for."));
    assert!(output.contains("Goodbye."));
    assert!(store.list_appointments().unwrap().is_empty());
}

#[test]
fn test_update_session() {
    let (_dir, store) = setup_store();
    let created = store
        .add_appointment("Ali", "15-06-2024", "10:00", Some("Mehmet"))
        .unwrap();

    let output = run_script(
        &store,
        &[
            "5", "1", "", "", "11:30", "", // change the time only
            "5", "1", "", "", "", "", // nothing supplied
            "5", "9999", "Veli", "", "", "",
            "3", "15-06-2024",
            "4", "al",
            "0",
        ],
    );

    assert!(output.contains("Appointment #1 updated."));
    assert!(output.contains("Nothing to update."));
    assert!(output.contains("Appointment #9999 not found."));
    assert!(output.contains("#1 Ali on 15-06-2024 at 11:30 (Mehmet)"));

    let updated = store.find_appointment(created.id).unwrap().unwrap();
    assert_eq!(updated.time, "11:30");
    assert_eq!(updated.customer_name, "Ali");
}

#[test]
fn test_shop_and_booking_session() {
    let (_dir, store) = setup_store();

    let output = run_script(
        &store,
        &[
            "7", "ayse", "s3cret", "ayse@example.com", "",
            "7", "ayse", "other", "", "",
            "8", "Mehmet Usta", "Fade",
            "9", "Sakal", "150", "20",
            "9", "Sakal", "175", "25",
            "9", "Boya", "-5", "30",
            "10", "1", "1", "1", "15-06-2024", "10:00",
            "10", "1", "7", "1", "15-06-2024", "11:00",
            "11",
            "0",
        ],
    );

    assert!(output.contains("Customer 'ayse' registered (#1)."));
    assert!(output.contains("Error: Customer 'ayse' already exists."));
    assert!(output.contains("Barber Mehmet Usta (Fade) added (#1)."));
    assert!(output.contains("Service Sakal (150.00, 20 min) added (#1)."));
    assert!(output.contains("Error: Service 'Sakal' already exists."));
    assert!(output.contains("Error: Price must be greater than zero."));
    assert!(output.contains("Booking #1 created for 15-06-2024 at 10:00."));
    assert!(output.contains(
        "Error: Booking refers to a customer, barber or service that does not exist."
    ));
    assert!(output.contains(
        "#1 ayse with Mehmet Usta - Sakal (150.00, 20 min) on 15-06-2024 at 10:00 [scheduled]"
    ));
    assert!(store.verify_customer("ayse", "s3cret").unwrap().is_some());
}

#[test]
fn test_end_of_input_ends_the_session() {
    let (_dir, store) = setup_store();

    let output = run_script(&store, &["1", "Ali"]);

    assert!(output.trim_end().ends_with("Goodbye."));
    assert!(store.list_appointments().unwrap().is_empty());
}
