use axum::http::StatusCode;
use axum_test::TestServer;
use campus::api::create_router;
use campus::db::Database;
use campus::models::*;
use serde_json::{json, Value};

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_test_career(server: &TestServer) -> Career {
    server
        .post("/api/v1/careers")
        .json(&CreateCareerInput {
            name: "Systems Engineering".to_string(),
            semesters: 9,
        })
        .await
        .json::<Career>()
}

async fn create_test_subject(server: &TestServer, career_id: i64) -> Subject {
    server
        .post("/api/v1/subjects")
        .json(&CreateSubjectInput {
            name: "Programming I".to_string(),
            credits: 8,
            semester: 1,
            career_id,
        })
        .await
        .json::<Subject>()
}

async fn create_test_teacher(server: &TestServer, name: &str) -> Teacher {
    server
        .post("/api/v1/teachers")
        .json(&CreateTeacherInput {
            name: name.to_string(),
            degree: Degree::Master,
        })
        .await
        .json::<Teacher>()
}

async fn create_test_classroom(server: &TestServer, name: &str) -> Classroom {
    server
        .post("/api/v1/classrooms")
        .json(&CreateClassroomInput {
            name: name.to_string(),
            building: "Main Building".to_string(),
        })
        .await
        .json::<Classroom>()
}

async fn create_test_slot(server: &TestServer, time: &str) -> TimeSlot {
    server
        .post("/api/v1/schedules")
        .json(&CreateTimeSlotInput {
            time: time.to_string(),
            shift: None,
        })
        .await
        .json::<TimeSlot>()
}

async fn create_test_student(server: &TestServer, email: &str, subjects: Vec<i64>) -> StudentDetail {
    server
        .post("/api/v1/students")
        .json(&CreateStudentInput {
            name: "Alex Morgan".to_string(),
            email: email.to_string(),
            status: StudentStatus::Active,
            date_of_birth: None,
            career_id: None,
            subjects,
        })
        .await
        .json::<StudentDetail>()
}

/// Career, subject, teacher, classroom and slot in one round trip, for
/// the group tests.
async fn create_group_fixture(server: &TestServer) -> CreateGroupInput {
    let career = create_test_career(server).await;
    let subject = create_test_subject(server, career.id).await;
    let teacher = create_test_teacher(server, "Jane Rivera").await;
    let classroom = create_test_classroom(server, "A-101").await;
    let slot = create_test_slot(server, "08:00").await;

    CreateGroupInput {
        name: "Group A".to_string(),
        career_id: career.id,
        subject_id: subject.id,
        teacher_id: teacher.id,
        classroom_id: classroom.id,
        schedule_id: slot.id,
        semester: 1,
        max_students: 30,
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/v1/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}

mod careers {
    use super::*;

    #[tokio::test]
    async fn creates_a_career_with_201() {
        let server = setup();
        let response = server
            .post("/api/v1/careers")
            .json(&CreateCareerInput {
                name: "Systems Engineering".to_string(),
                semesters: 9,
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let career: Career = response.json();
        assert_eq!(career.name, "Systems Engineering");
    }

    #[tokio::test]
    async fn rejects_invalid_input_with_400() {
        let server = setup();
        let response = server
            .post("/api/v1/careers")
            .json(&CreateCareerInput {
                name: "".to_string(),
                semesters: 9,
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_a_duplicate_name_with_409() {
        let server = setup();
        create_test_career(&server).await;

        let response = server
            .post("/api/v1/careers")
            .json(&CreateCareerInput {
                name: "Systems Engineering".to_string(),
                semesters: 8,
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn returns_404_for_a_missing_career() {
        let server = setup();
        let response = server.get("/api/v1/careers/999").await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["message"], "Career not found");
    }

    #[tokio::test]
    async fn returns_400_for_a_non_numeric_id() {
        let server = setup();
        let response = server.get("/api/v1/careers/abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn applies_a_partial_update() {
        let server = setup();
        let career = create_test_career(&server).await;

        let response = server
            .put(&format!("/api/v1/careers/{}", career.id))
            .json(&json!({ "semesters": 10 }))
            .await;

        response.assert_status_ok();
        let updated: Career = response.json();
        assert_eq!(updated.name, "Systems Engineering");
        assert_eq!(updated.semesters, 10);
    }

    #[tokio::test]
    async fn deletes_with_204() {
        let server = setup();
        let career = create_test_career(&server).await;

        let response = server.delete(&format!("/api/v1/careers/{}", career.id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.get(&format!("/api/v1/careers/{}", career.id)).await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn refuses_to_delete_with_dependents() {
        let server = setup();
        let career = create_test_career(&server).await;
        create_test_subject(&server, career.id).await;

        let response = server.delete(&format!("/api/v1/careers/{}", career.id)).await;
        response.assert_status(StatusCode::CONFLICT);
    }
}

mod students {
    use super::*;

    #[tokio::test]
    async fn creates_a_student_with_registrations() {
        let server = setup();
        let career = create_test_career(&server).await;
        let subject = create_test_subject(&server, career.id).await;

        let response = server
            .post("/api/v1/students")
            .json(&CreateStudentInput {
                name: "Alex Morgan".to_string(),
                email: "alex@campus.edu".to_string(),
                status: StudentStatus::Active,
                date_of_birth: None,
                career_id: Some(career.id),
                subjects: vec![subject.id],
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let detail: StudentDetail = response.json();
        assert_eq!(detail.subjects.len(), 1);
        assert_eq!(detail.subjects[0].name, "Programming I");
    }

    #[tokio::test]
    async fn rejects_a_duplicate_email_with_409() {
        let server = setup();
        create_test_student(&server, "alex@campus.edu", vec![]).await;

        let response = server
            .post("/api/v1/students")
            .json(&CreateStudentInput {
                name: "Other Alex".to_string(),
                email: "alex@campus.edu".to_string(),
                status: StudentStatus::Active,
                date_of_birth: None,
                career_id: None,
                subjects: vec![],
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn replaces_registrations_on_update() {
        let server = setup();
        let career = create_test_career(&server).await;
        let subject = create_test_subject(&server, career.id).await;
        let student = create_test_student(&server, "alex@campus.edu", vec![]).await;

        let response = server
            .put(&format!("/api/v1/students/{}", student.student.id))
            .json(&json!({ "subjects": [subject.id] }))
            .await;

        response.assert_status_ok();
        let detail: StudentDetail = response.json();
        assert_eq!(detail.subjects.len(), 1);
        assert_eq!(detail.subjects[0].subject_id, subject.id);
    }
}

mod groups {
    use super::*;

    #[tokio::test]
    async fn creates_a_group_with_display_names() {
        let server = setup();
        let input = create_group_fixture(&server).await;

        let response = server.post("/api/v1/groups").json(&input).await;

        response.assert_status(StatusCode::CREATED);
        let group: Group = response.json();
        assert_eq!(group.name, "Group A");
        assert_eq!(group.subject_name.as_deref(), Some("Programming I"));
        assert_eq!(group.teacher_name.as_deref(), Some("Jane Rivera"));
        assert_eq!(group.classroom_name.as_deref(), Some("A-101"));
        assert_eq!(group.schedule_shift, Some(Shift::Morning));
    }

    #[tokio::test]
    async fn auto_enrolls_registered_students() {
        let server = setup();
        let input = create_group_fixture(&server).await;
        let student =
            create_test_student(&server, "alex@campus.edu", vec![input.subject_id]).await;

        let response = server.post("/api/v1/groups").json(&input).await;
        response.assert_status(StatusCode::CREATED);
        let group: Group = response.json();

        let response = server.get(&format!("/api/v1/groups/{}", group.id)).await;
        response.assert_status_ok();
        let detail: GroupDetail = response.json();
        assert_eq!(detail.students.len(), 1);
        assert_eq!(detail.students[0].student_id, student.student.id);
        assert_eq!(detail.students[0].name, "Alex Morgan");
    }

    #[tokio::test]
    async fn rejects_a_duplicate_name_with_409() {
        let server = setup();
        let input = create_group_fixture(&server).await;
        server.post("/api/v1/groups").json(&input).await;

        let other_teacher = create_test_teacher(&server, "Luis Mendoza").await;
        let other_room = create_test_classroom(&server, "B-201").await;
        let other_slot = create_test_slot(&server, "16:00").await;
        let response = server
            .post("/api/v1/groups")
            .json(&CreateGroupInput {
                teacher_id: other_teacher.id,
                classroom_id: other_room.id,
                schedule_id: other_slot.id,
                ..input
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            "A group named 'Group A' already exists for this subject"
        );
    }

    #[tokio::test]
    async fn rejects_a_double_booked_teacher_with_409() {
        let server = setup();
        let input = create_group_fixture(&server).await;
        server.post("/api/v1/groups").json(&input).await;

        let other_room = create_test_classroom(&server, "B-201").await;
        let response = server
            .post("/api/v1/groups")
            .json(&CreateGroupInput {
                name: "Group B".to_string(),
                classroom_id: other_room.id,
                ..input
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            "Teacher Jane Rivera already has a group in this time slot"
        );
    }

    #[tokio::test]
    async fn scopes_the_list_to_a_teacher() {
        let server = setup();
        let input = create_group_fixture(&server).await;
        let mine: Group = server.post("/api/v1/groups").json(&input).await.json();

        let other_teacher = create_test_teacher(&server, "Luis Mendoza").await;
        let other_room = create_test_classroom(&server, "B-201").await;
        let other_slot = create_test_slot(&server, "16:00").await;
        server
            .post("/api/v1/groups")
            .json(&CreateGroupInput {
                name: "Group B".to_string(),
                teacher_id: other_teacher.id,
                classroom_id: other_room.id,
                schedule_id: other_slot.id,
                ..input.clone()
            })
            .await;

        let response = server
            .get(&format!("/api/v1/groups?teacherId={}", input.teacher_id))
            .await;
        response.assert_status_ok();
        let groups: Vec<Group> = response.json();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, mine.id);

        let all: Vec<Group> = server.get("/api/v1/groups").await.json();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn hides_a_scoped_group_from_another_teacher() {
        let server = setup();
        let input = create_group_fixture(&server).await;
        let group: Group = server.post("/api/v1/groups").json(&input).await.json();
        let other_teacher = create_test_teacher(&server, "Luis Mendoza").await;

        let response = server
            .get(&format!(
                "/api/v1/groups/{}?teacherId={}",
                group.id, other_teacher.id
            ))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn shrinking_capacity_trims_the_roster() {
        let server = setup();
        let input = create_group_fixture(&server).await;
        for i in 0..3 {
            create_test_student(
                &server,
                &format!("student{}@campus.edu", i),
                vec![input.subject_id],
            )
            .await;
        }
        let group: Group = server.post("/api/v1/groups").json(&input).await.json();

        let response = server
            .put(&format!("/api/v1/groups/{}", group.id))
            .json(&json!({ "maxStudents": 2 }))
            .await;
        response.assert_status_ok();

        let detail: GroupDetail = server
            .get(&format!("/api/v1/groups/{}", group.id))
            .await
            .json();
        assert_eq!(detail.students.len(), 2);
    }

    #[tokio::test]
    async fn deletes_with_204_and_then_404() {
        let server = setup();
        let input = create_group_fixture(&server).await;
        let group: Group = server.post("/api/v1/groups").json(&input).await.json();

        let response = server.delete(&format!("/api/v1/groups/{}", group.id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.delete(&format!("/api/v1/groups/{}", group.id)).await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn rejects_an_empty_update_with_400() {
        let server = setup();
        let input = create_group_fixture(&server).await;
        let group: Group = server.post("/api/v1/groups").json(&input).await.json();

        let response = server
            .put(&format!("/api/v1/groups/{}", group.id))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

mod schedules {
    use super::*;

    #[tokio::test]
    async fn infers_the_shift_from_the_hour() {
        let server = setup();

        let morning: TimeSlot = server
            .post("/api/v1/schedules")
            .json(&json!({ "time": "09:30" }))
            .await
            .json();
        assert_eq!(morning.shift, Shift::Morning);

        let afternoon: TimeSlot = server
            .post("/api/v1/schedules")
            .json(&json!({ "time": "14:00" }))
            .await
            .json();
        assert_eq!(afternoon.shift, Shift::Afternoon);
    }

    #[tokio::test]
    async fn rejects_a_duplicate_time_with_409() {
        let server = setup();
        create_test_slot(&server, "08:00").await;

        let response = server
            .post("/api/v1/schedules")
            .json(&json!({ "time": "08:00" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }
}
