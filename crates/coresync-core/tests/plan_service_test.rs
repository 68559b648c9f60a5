//! Integration tests for the plan service layer.
//!
//! Normalizes plans and saves them as routines against a real PostgreSQL
//! database. Each test creates an isolated temporary database.

use serde_json::json;
use uuid::Uuid;

use coresync_core::plan::{
    PlanInput, ROUTINE_CATEGORY, get_plan_with_routines, normalize, routine_records,
    save_plan_as_routines,
};
use coresync_db::queries::ai_plans::{self, NewAiPlan};
use coresync_db::queries::routines;
use coresync_test_utils::{create_test_db, drop_test_db, seed_user};

#[tokio::test]
async fn save_text_plan_as_routines() {
    let (pool, db_name) = create_test_db().await;
    let owner = seed_user(&pool, "alex").await;

    let normalized = normalize(
        PlanInput::from(
            "Monday – Push Day\n• Push-ups (8-12)\n• Shoulder Press (8-10)\nWarmup: 5 min walk\n\
             Wednesday – Legs\n• Squat (4 x 6)",
        ),
        "Build muscle",
    )
    .unwrap();
    let records = routine_records(&normalized.plan, owner, None, &normalized.goal_label);

    let saved = save_plan_as_routines(&pool, &records).await.unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].title, "Monday Workout");
    assert_eq!(saved[0].category, ROUTINE_CATEGORY);
    assert_eq!(saved[0].goal_label, "Build muscle");
    assert_eq!(saved[0].plan_id, None);
    assert_eq!(
        saved[0].exercises,
        json!([
            {"name": "Push-ups", "sets": 3, "reps": "8-12",
             "category": "Monday – Push Day", "warmup": "5 min walk"},
            {"name": "Shoulder Press", "sets": 3, "reps": "8-10",
             "category": "Monday – Push Day", "warmup": "5 min walk"}
        ])
    );

    let listed = routines::list_routines_for_user(&pool, owner).await.unwrap();
    assert_eq!(listed.len(), 2);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn routines_link_back_to_their_plan() {
    let (pool, db_name) = create_test_db().await;
    let owner = seed_user(&pool, "blair").await;

    let document = json!({"weekly_plan": [
        {"day": "Wednesday", "focus": "Upper", "exercises": [{"name": "A", "sets": 3, "reps": "10"}]},
        {"day": "Wednesday", "focus": "Core", "exercises": [{"name": "B", "sets": 2, "reps": "30 sec"}]},
        {"day": "Sunday", "exercises": []}
    ]});
    let normalized = normalize(PlanInput::from(document.clone()), "General fitness").unwrap();
    let plan_doc = serde_json::to_value(&normalized.plan).unwrap();

    let stored = ai_plans::insert_ai_plan(
        &pool,
        &NewAiPlan {
            user_id: owner,
            goal: "General fitness",
            experience: "beginner",
            days_per_week: 2,
            equipment: "",
            injuries: "",
            raw_plan: &document.to_string(),
            plan: &plan_doc,
        },
    )
    .await
    .unwrap();

    let records = routine_records(&normalized.plan, owner, Some(stored.id), &normalized.goal_label);
    save_plan_as_routines(&pool, &records).await.unwrap();

    let (plan, saved) = get_plan_with_routines(&pool, owner, stored.id)
        .await
        .unwrap()
        .expect("plan should exist");
    assert_eq!(plan.id, stored.id);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "Wednesday Workout");
    let names: Vec<&str> = saved[0]
        .exercises
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B"]);

    let missing = get_plan_with_routines(&pool, owner, Uuid::new_v4()).await.unwrap();
    assert!(missing.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn failed_insert_rolls_back_all_routines() {
    let (pool, db_name) = create_test_db().await;
    let owner = seed_user(&pool, "casey").await;

    let normalized = normalize(
        PlanInput::from("Monday\n- Row\nTuesday\n- Press"),
        "Strength",
    )
    .unwrap();
    let mut records = routine_records(&normalized.plan, owner, None, &normalized.goal_label);
    // Second record references a plan that does not exist.
    records[1].plan_id = Some(Uuid::new_v4());

    assert!(save_plan_as_routines(&pool, &records).await.is_err());
    assert!(routines::list_routines_for_user(&pool, owner).await.unwrap().is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}
