use learning_tracker::db::Database;
use learning_tracker::models::*;
use speculate2::speculate;
use tokio::runtime::Runtime;

fn create_test_day(rt: &Runtime, db: &Database, date: &str) -> DayRecord {
    rt.block_on(db.create_day(CreateDayInput {
        date: date.to_string(),
        completed: false,
        content: String::new(),
    }))
    .expect("Failed to create day")
}

speculate! {
    before {
        let rt = Runtime::new().expect("Failed to start runtime");
        let db = Database::open_memory().expect("Failed to create in-memory database");
        rt.block_on(db.migrate()).expect("Failed to run migrations");
    }

    describe "migrate" {
        it "is idempotent" {
            create_test_day(&rt, &db, "2024-01-01");
            rt.block_on(db.migrate()).expect("Second migrate failed");

            let days = rt.block_on(db.list_days()).expect("Query failed");
            assert_eq!(days.len(), 1);
        }
    }

    describe "create_day" {
        it "stores all fields" {
            let day = rt.block_on(db.create_day(CreateDayInput {
                date: "2024-02-01".to_string(),
                completed: true,
                content: "Traits and generics".to_string(),
            })).expect("Failed to create");

            assert!(day.id.is_some());
            assert!(day.completed);
            assert_eq!(day.content, "Traits and generics");
            assert!(day.updated_at.is_some());
        }

        it "fails with a unique violation on a duplicate date" {
            create_test_day(&rt, &db, "2024-02-02");

            let err = rt.block_on(db.create_day(CreateDayInput {
                date: "2024-02-02".to_string(),
                completed: true,
                content: "again".to_string(),
            })).expect_err("Duplicate insert should fail");

            assert!(err.is_unique_violation());
            let days = rt.block_on(db.list_days()).expect("Query failed");
            assert_eq!(days.len(), 1);
            assert!(!days[0].completed);
        }

        it "never reuses ids" {
            let first = create_test_day(&rt, &db, "2024-02-03");
            let second = create_test_day(&rt, &db, "2024-02-04");

            assert!(second.id.unwrap() > first.id.unwrap());
        }
    }

    describe "find_day" {
        it "returns None for an unknown date" {
            let found = rt.block_on(db.find_day("2024-03-01")).expect("Query failed");
            assert!(found.is_none());
        }

        it "returns the stored record" {
            let created = create_test_day(&rt, &db, "2024-03-02");

            let found = rt.block_on(db.find_day("2024-03-02")).expect("Query failed");
            assert_eq!(found, Some(created));
        }

        it "matches dates exactly" {
            create_test_day(&rt, &db, "2024-03-03");

            let found = rt.block_on(db.find_day("2024-03-0")).expect("Query failed");
            assert!(found.is_none());
        }
    }

    describe "list_days" {
        it "returns empty list when no days exist" {
            let days = rt.block_on(db.list_days()).expect("Query failed");
            assert!(days.is_empty());
        }

        it "orders by date descending" {
            create_test_day(&rt, &db, "2024-01-01");
            create_test_day(&rt, &db, "2024-01-03");
            create_test_day(&rt, &db, "2024-01-02");

            let days = rt.block_on(db.list_days()).expect("Query failed");
            let dates: Vec<_> = days.iter().map(|d| d.date.as_str()).collect();
            assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
        }
    }

    describe "update_day" {
        it "inserts when the date has no record" {
            let day = rt.block_on(db.update_day("2024-04-01", UpdateDayInput {
                completed: Some(true),
                content: None,
            })).expect("Upsert failed");

            assert!(day.id.is_some());
            assert!(day.completed);
            assert_eq!(day.content, "");
        }

        it "keeps the id of an existing record" {
            let created = create_test_day(&rt, &db, "2024-04-02");

            let day = rt.block_on(db.update_day("2024-04-02", UpdateDayInput {
                completed: Some(true),
                content: Some("Pattern matching".to_string()),
            })).expect("Upsert failed");

            assert_eq!(day.id, created.id);
            assert!(day.completed);
            assert_eq!(day.content, "Pattern matching");
        }

        it "leaves absent fields unchanged" {
            rt.block_on(db.update_day("2024-04-03", UpdateDayInput {
                completed: Some(true),
                content: Some("before".to_string()),
            })).expect("Upsert failed");

            let day = rt.block_on(db.update_day("2024-04-03", UpdateDayInput {
                completed: None,
                content: Some("after".to_string()),
            })).expect("Upsert failed");

            assert!(day.completed);
            assert_eq!(day.content, "after");
        }

        it "persists what it returns" {
            let day = rt.block_on(db.update_day("2024-04-04", UpdateDayInput {
                completed: Some(true),
                content: Some("Closures".to_string()),
            })).expect("Upsert failed");

            let found = rt.block_on(db.find_day("2024-04-04")).expect("Query failed");
            assert_eq!(found, Some(day));
        }
    }

    describe "import_days" {
        it "upserts by date without duplicating" {
            create_test_day(&rt, &db, "2024-05-01");
            let rows = vec![
                ImportedDay {
                    date: "2024-05-01".to_string(),
                    completed: true,
                    content: "imported".to_string(),
                    updated_at: "2024-05-01T20:00:00".to_string(),
                },
                ImportedDay {
                    date: "2024-05-02".to_string(),
                    completed: false,
                    content: String::new(),
                    updated_at: String::new(),
                },
            ];

            let written = rt.block_on(db.import_days(&rows)).expect("Import failed");
            assert_eq!(written, 2);
            rt.block_on(db.import_days(&rows)).expect("Second import failed");

            let days = rt.block_on(db.list_days()).expect("Query failed");
            assert_eq!(days.len(), 2);
            let first = days.iter().find(|d| d.date == "2024-05-01").unwrap();
            assert!(first.completed);
            assert_eq!(first.content, "imported");
            assert_eq!(first.updated_at.as_deref(), Some("2024-05-01T20:00:00"));
        }
    }

    describe "connection_info" {
        it "describes the in-memory store" {
            assert_eq!(db.connection_info(), "sqlite::memory:");
        }
    }
}
