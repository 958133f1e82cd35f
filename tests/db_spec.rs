use campus::db::Database;
use campus::error::CoreError;
use campus::models::*;
use speculate2::speculate;

fn create_test_career(db: &Database) -> Career {
    db.create_career(CreateCareerInput {
        name: "Systems Engineering".to_string(),
        semesters: 9,
    })
    .expect("Failed to create career")
}

fn create_test_subject(db: &Database, career_id: i64, name: &str) -> Subject {
    db.create_subject(CreateSubjectInput {
        name: name.to_string(),
        credits: 8,
        semester: 1,
        career_id,
    })
    .expect("Failed to create subject")
}

fn create_test_student(db: &Database, name: &str, email: &str, subjects: Vec<i64>) -> StudentDetail {
    db.create_student(CreateStudentInput {
        name: name.to_string(),
        email: email.to_string(),
        status: StudentStatus::Active,
        date_of_birth: None,
        career_id: None,
        subjects,
    })
    .expect("Failed to create student")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "careers" {
        it "creates a career" {
            let career = create_test_career(&db);
            assert_eq!(career.name, "Systems Engineering");
            assert_eq!(career.semesters, 9);
        }

        it "rejects a duplicate career name" {
            create_test_career(&db);
            let result = db.create_career(CreateCareerInput {
                name: "Systems Engineering".to_string(),
                semesters: 8,
            });
            assert!(matches!(result, Err(CoreError::Conflict(_))));
        }

        it "rejects a non-positive semester count" {
            let result = db.create_career(CreateCareerInput {
                name: "Empty".to_string(),
                semesters: 0,
            });
            assert!(matches!(result, Err(CoreError::Validation(_))));
        }

        it "applies partial updates" {
            let career = create_test_career(&db);
            let updated = db.update_career(career.id, UpdateCareerInput {
                name: None,
                semesters: Some(10),
            }).expect("Failed to update career");
            assert_eq!(updated.name, "Systems Engineering");
            assert_eq!(updated.semesters, 10);
        }

        it "returns NotFound when updating a missing career" {
            let result = db.update_career(999, UpdateCareerInput {
                name: Some("Ghost".to_string()),
                semesters: None,
            });
            assert!(matches!(result, Err(CoreError::NotFound(_))));
        }

        it "deletes a career without dependents" {
            let career = create_test_career(&db);
            db.delete_career(career.id).expect("Failed to delete career");
            assert!(db.get_career(career.id).unwrap().is_none());
        }

        it "refuses to delete a career with subjects attached" {
            let career = create_test_career(&db);
            create_test_subject(&db, career.id, "Programming I");
            let result = db.delete_career(career.id);
            assert!(matches!(result, Err(CoreError::Dependency(_))));
            assert!(db.get_career(career.id).unwrap().is_some());
        }
    }

    describe "subjects" {
        it "creates a subject enriched with the career name" {
            let career = create_test_career(&db);
            let subject = create_test_subject(&db, career.id, "Programming I");
            assert_eq!(subject.career_name.as_deref(), Some("Systems Engineering"));
        }

        it "rejects a subject for a missing career" {
            let result = db.create_subject(CreateSubjectInput {
                name: "Orphan".to_string(),
                credits: 5,
                semester: 1,
                career_id: 999,
            });
            assert!(matches!(result, Err(CoreError::Validation(_))));
        }

        it "rejects a duplicate subject name within a career" {
            let career = create_test_career(&db);
            create_test_subject(&db, career.id, "Programming I");
            let result = db.create_subject(CreateSubjectInput {
                name: "Programming I".to_string(),
                credits: 6,
                semester: 2,
                career_id: career.id,
            });
            assert!(matches!(result, Err(CoreError::Conflict(_))));
        }

        it "allows the same subject name in different careers" {
            let career = create_test_career(&db);
            let other = db.create_career(CreateCareerInput {
                name: "Business Administration".to_string(),
                semesters: 8,
            }).unwrap();
            create_test_subject(&db, career.id, "Mathematics");
            let subject = create_test_subject(&db, other.id, "Mathematics");
            assert_eq!(subject.career_id, other.id);
        }

        it "refuses to delete a subject with registrations" {
            let career = create_test_career(&db);
            let subject = create_test_subject(&db, career.id, "Programming I");
            create_test_student(&db, "Alex", "alex@campus.edu", vec![subject.id]);
            let result = db.delete_subject(subject.id);
            assert!(matches!(result, Err(CoreError::Dependency(_))));
        }
    }

    describe "classrooms" {
        it "rejects a duplicate classroom name" {
            db.create_classroom(CreateClassroomInput {
                name: "A-101".to_string(),
                building: "Main Building".to_string(),
            }).unwrap();
            let result = db.create_classroom(CreateClassroomInput {
                name: "A-101".to_string(),
                building: "Laboratory Building".to_string(),
            });
            assert!(matches!(result, Err(CoreError::Conflict(_))));
        }

        it "deletes a classroom without groups" {
            let room = db.create_classroom(CreateClassroomInput {
                name: "A-101".to_string(),
                building: "Main Building".to_string(),
            }).unwrap();
            db.delete_classroom(room.id).expect("Failed to delete classroom");
            assert!(db.get_classroom(room.id).unwrap().is_none());
        }
    }

    describe "time slots" {
        it "infers the morning shift from the hour" {
            let slot = db.create_time_slot(CreateTimeSlotInput {
                time: "08:00".to_string(),
                shift: None,
            }).unwrap();
            assert_eq!(slot.shift, Shift::Morning);
        }

        it "infers the afternoon shift from the hour" {
            let slot = db.create_time_slot(CreateTimeSlotInput {
                time: "16:00".to_string(),
                shift: None,
            }).unwrap();
            assert_eq!(slot.shift, Shift::Afternoon);
        }

        it "honors an explicit shift override" {
            let slot = db.create_time_slot(CreateTimeSlotInput {
                time: "08:00".to_string(),
                shift: Some(Shift::Afternoon),
            }).unwrap();
            assert_eq!(slot.shift, Shift::Afternoon);
        }

        it "rejects a duplicate clock time" {
            db.create_time_slot(CreateTimeSlotInput {
                time: "08:00".to_string(),
                shift: None,
            }).unwrap();
            let result = db.create_time_slot(CreateTimeSlotInput {
                time: "08:00".to_string(),
                shift: Some(Shift::Afternoon),
            });
            assert!(matches!(result, Err(CoreError::Conflict(_))));
        }

        it "lists slots ordered by time" {
            for time in ["16:00", "08:00", "10:00"] {
                db.create_time_slot(CreateTimeSlotInput {
                    time: time.to_string(),
                    shift: None,
                }).unwrap();
            }
            let times: Vec<String> = db.get_all_time_slots().unwrap()
                .into_iter().map(|s| s.time).collect();
            assert_eq!(times, vec!["08:00", "10:00", "16:00"]);
        }
    }

    describe "teachers" {
        it "creates and updates a teacher" {
            let teacher = db.create_teacher(CreateTeacherInput {
                name: "Jane Rivera".to_string(),
                degree: Degree::Master,
            }).unwrap();

            let updated = db.update_teacher(teacher.id, UpdateTeacherInput {
                name: None,
                degree: Some(Degree::Doctorate),
            }).unwrap();
            assert_eq!(updated.name, "Jane Rivera");
            assert_eq!(updated.degree, Degree::Doctorate);
        }

        it "returns NotFound when deleting a missing teacher" {
            let result = db.delete_teacher(42);
            assert!(matches!(result, Err(CoreError::NotFound(_))));
        }
    }

    describe "students" {
        it "creates a student with subject registrations" {
            let career = create_test_career(&db);
            let s1 = create_test_subject(&db, career.id, "Programming I");
            let s2 = create_test_subject(&db, career.id, "Databases");

            let student = create_test_student(&db, "Alex", "alex@campus.edu", vec![s1.id, s2.id]);
            assert_eq!(student.subjects.len(), 2);
            assert_eq!(student.subjects[0].subject_id, s1.id);
        }

        it "deduplicates the submitted registration list" {
            let career = create_test_career(&db);
            let subject = create_test_subject(&db, career.id, "Programming I");

            let student = create_test_student(
                &db, "Alex", "alex@campus.edu", vec![subject.id, subject.id],
            );
            assert_eq!(student.subjects.len(), 1);
        }

        it "rejects a duplicate email" {
            create_test_student(&db, "Alex", "alex@campus.edu", vec![]);
            let result = db.create_student(CreateStudentInput {
                name: "Other Alex".to_string(),
                email: "alex@campus.edu".to_string(),
                status: StudentStatus::Active,
                date_of_birth: None,
                career_id: None,
                subjects: vec![],
            });
            assert!(matches!(result, Err(CoreError::Conflict(_))));
        }

        it "replaces the registration set on update" {
            let career = create_test_career(&db);
            let s1 = create_test_subject(&db, career.id, "Programming I");
            let s2 = create_test_subject(&db, career.id, "Databases");
            let student = create_test_student(&db, "Alex", "alex@campus.edu", vec![s1.id]);

            let updated = db.update_student(student.student.id, UpdateStudentInput {
                name: None,
                email: None,
                status: None,
                date_of_birth: None,
                career_id: None,
                subjects: Some(vec![s2.id]),
            }).unwrap();

            assert_eq!(updated.subjects.len(), 1);
            assert_eq!(updated.subjects[0].subject_id, s2.id);
        }

        it "removes registrations when the student is deleted" {
            let career = create_test_career(&db);
            let subject = create_test_subject(&db, career.id, "Programming I");
            let student = create_test_student(&db, "Alex", "alex@campus.edu", vec![subject.id]);

            db.delete_student(student.student.id).expect("Failed to delete student");
            assert!(db.get_student(student.student.id).unwrap().is_none());
            // The subject has no registrations left, so it can be deleted.
            db.delete_subject(subject.id).expect("Failed to delete subject");
        }
    }

    describe "persistence" {
        it "keeps data across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("campus.db");

            {
                let db = Database::open(path.clone()).expect("Failed to open database");
                db.migrate().expect("Failed to run migrations");
                create_test_career(&db);
            }

            let db = Database::open(path).expect("Failed to reopen database");
            db.migrate().expect("Failed to run migrations");
            let careers = db.get_all_careers().expect("Failed to list careers");
            assert_eq!(careers.len(), 1);
            assert_eq!(careers[0].name, "Systems Engineering");
        }
    }
}
