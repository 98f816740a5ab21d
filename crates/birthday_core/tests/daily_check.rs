use birthday_core::db::open_db_in_memory;
use birthday_core::{
    BirthdayRecord, BirthdayRepository, DailyCheckService, FixedClock, GreetingTemplate,
    LogNotifier, Notifier, NotifyError, NotifySettings, OutboxNotifier, SqliteBirthdayRepository,
};
use chrono::NaiveDate;
use std::cell::RefCell;

fn christmas() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()
}

fn seeded(repo: &SqliteBirthdayRepository<'_>) {
    let records = [
        BirthdayRecord::new("Ana", "25-12", "+34 600 111 222"),
        BirthdayRecord::new("Bo", "24-12", "+1 555 0100"),
        BirthdayRecord::new("Cy", "25/12", "").with_message("Merry birthday Cy"),
    ];
    for record in &records {
        repo.save(None, record).unwrap();
    }
}

/// Fails for one recipient, records the rest.
struct FlakyNotifier {
    fail_for: &'static str,
    delivered: RefCell<Vec<String>>,
}

impl Notifier for FlakyNotifier {
    fn channel(&self) -> &'static str {
        "flaky"
    }

    fn notify(&self, recipient_name: &str, _message: &str, _phone: &str) -> Result<(), NotifyError> {
        if recipient_name == self.fail_for {
            return Err(NotifyError::new("flaky", "app not installed"));
        }
        self.delivered.borrow_mut().push(recipient_name.to_string());
        Ok(())
    }
}

#[test]
fn delivers_one_greeting_per_match_in_list_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    seeded(&repo);

    let outbox = OutboxNotifier::new();
    let settings = NotifySettings {
        default_greeting: GreetingTemplate::new("Feliz cumple, {name}!"),
        ..NotifySettings::default()
    };
    let service = DailyCheckService::new(repo, &outbox, settings);

    let report = service.run(christmas()).unwrap();
    assert_eq!(report.checked, 3);
    assert_eq!(report.names, vec!["Ana", "Cy"]);
    assert_eq!(report.notified, 2);
    assert_eq!(report.failed, 0);

    let deliveries = outbox.drain();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0].message, "Feliz cumple, Ana!");
    assert_eq!(
        deliveries[0].link,
        "https://wa.me/34600111222?text=Feliz%20cumple%2C%20Ana%21"
    );
    assert_eq!(deliveries[1].message, "Merry birthday Cy");
}

#[test]
fn failed_delivery_is_counted_and_does_not_stop_others() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    seeded(&repo);

    let notifier = FlakyNotifier {
        fail_for: "Ana",
        delivered: RefCell::new(Vec::new()),
    };
    let service = DailyCheckService::new(repo, &notifier, NotifySettings::default());

    let report = service.run(christmas()).unwrap();
    assert_eq!(report.notified, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.matched(), 2);
    assert_eq!(*notifier.delivered.borrow(), vec!["Cy".to_string()]);
}

#[test]
fn every_run_sees_the_latest_store_contents() {
    let conn = open_db_in_memory().unwrap();
    let writer = SqliteBirthdayRepository::try_new(&conn).unwrap();
    let service = DailyCheckService::new(
        SqliteBirthdayRepository::try_new(&conn).unwrap(),
        LogNotifier,
        NotifySettings::default(),
    );

    assert_eq!(service.run(christmas()).unwrap().matched(), 0);
    writer
        .save(None, &BirthdayRecord::new("Late", "25-12", ""))
        .unwrap();
    assert_eq!(service.run(christmas()).unwrap().names, vec!["Late"]);
}

#[test]
fn run_with_clock_uses_clock_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    seeded(&repo);
    let service = DailyCheckService::new(repo, LogNotifier, NotifySettings::default());

    let clock = FixedClock::new(NaiveDate::from_ymd_opt(2026, 12, 24).unwrap());
    let report = service.run_with_clock(&clock).unwrap();
    assert_eq!(report.today, NaiveDate::from_ymd_opt(2026, 12, 24));
    assert_eq!(report.names, vec!["Bo"]);
}
