//! Integration tests for cascade permanent deletion.

use chrono::Utc;
use taskboard_core::board::{
    EntityKind, NewCategory, NewProject, NewSubCategory, NewTask, ProjectStatus, TaskPriority,
    TaskStatus,
};
use taskboard_core::deletion;
use taskboard_core::storage::BoardDb;

struct Board {
    db: BoardDb,
    project: i64,
    categories: [i64; 2],
    subs: [i64; 3],
    tasks: [i64; 5],
}

/// A project with 2 categories, 3 subcategories, 5 tasks, and history rows.
fn seed() -> Board {
    let db = BoardDb::open_memory().unwrap();
    let project = db
        .create_project(&NewProject {
            name: "Driver".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            color: String::new(),
        })
        .unwrap();
    let cat_a = db
        .create_category(&NewCategory {
            project_id: project.id,
            name: "Design".to_string(),
            order: 0,
        })
        .unwrap();
    let cat_b = db
        .create_category(&NewCategory {
            project_id: project.id,
            name: "Implementation".to_string(),
            order: 1,
        })
        .unwrap();
    let make_sub = |category: i64, name: &str, order: i64| {
        db.create_sub_category(&NewSubCategory {
            category_id: category,
            project_id: project.id,
            name: name.to_string(),
            order,
        })
        .unwrap()
        .id
    };
    let subs = [
        make_sub(cat_a.id, "API", 0),
        make_sub(cat_b.id, "Sockets", 0),
        make_sub(cat_b.id, "Reconnect", 1),
    ];
    let sub_parents = [cat_a.id, cat_b.id, cat_b.id];
    let mut tasks = [0i64; 5];
    for (i, task) in tasks.iter_mut().enumerate() {
        let sub_index = i % 3;
        *task = db
            .create_task(&NewTask {
                sub_category_id: subs[sub_index],
                category_id: sub_parents[sub_index],
                project_id: project.id,
                title: format!("task {i}"),
                description: String::new(),
                status: TaskStatus::Todo,
                priority: TaskPriority::Medium,
                assignee: String::new(),
                due_date: String::new(),
                progress: 0,
                checklist: Vec::new(),
            })
            .unwrap()
            .id;
        db.add_history(*task, "status", "\"TODO\"", "\"IN_PROGRESS\"", Utc::now())
            .unwrap();
    }

    Board {
        db,
        project: project.id,
        categories: [cat_a.id, cat_b.id],
        subs,
        tasks,
    }
}

#[test]
fn deleting_a_project_leaves_no_referencing_rows() {
    let board = seed();

    deletion::delete_project(&board.db, board.project).unwrap();

    assert_eq!(board.db.count(EntityKind::Project).unwrap(), 0);
    assert_eq!(board.db.count(EntityKind::Category).unwrap(), 0);
    assert_eq!(board.db.count(EntityKind::SubCategory).unwrap(), 0);
    assert_eq!(board.db.count(EntityKind::Task).unwrap(), 0);
    assert!(board.db.list_task_history().unwrap().is_empty());
}

#[test]
fn deleting_a_category_spares_its_siblings() {
    let board = seed();

    deletion::delete_category(&board.db, board.categories[1]).unwrap();

    // cat_a and its subtree survive.
    assert!(board.db.get_category(board.categories[0]).unwrap().is_some());
    assert!(board.db.get_sub_category(board.subs[0]).unwrap().is_some());
    // cat_b's subtree is gone.
    assert!(board.db.get_sub_category(board.subs[1]).unwrap().is_none());
    assert!(board.db.get_sub_category(board.subs[2]).unwrap().is_none());
    for task in board.db.list_tasks().unwrap() {
        assert_eq!(task.category_id, board.categories[0]);
    }
}

#[test]
fn deleting_a_sub_category_removes_its_tasks_and_history() {
    let board = seed();

    deletion::delete_sub_category(&board.db, board.subs[0]).unwrap();

    assert!(board.db.get_sub_category(board.subs[0]).unwrap().is_none());
    for task in board.db.list_tasks().unwrap() {
        assert_ne!(task.sub_category_id, board.subs[0]);
    }
    for record in board.db.list_task_history().unwrap() {
        assert!(board.db.get_task(record.task_id).unwrap().is_some());
    }
}

#[test]
fn delete_is_not_undoable_but_atomic() {
    let board = seed();
    deletion::delete_task(&board.db, board.tasks[0]).unwrap();
    assert!(board.db.get_task(board.tasks[0]).unwrap().is_none());

    // Deleting again fails cleanly with NotFound and changes nothing else.
    assert!(deletion::delete_task(&board.db, board.tasks[0]).is_err());
    assert_eq!(board.db.count(EntityKind::Task).unwrap(), 4);
}

#[test]
fn bulk_delete_reports_failures_and_keeps_going() {
    let board = seed();

    let items = [
        (EntityKind::Task, board.tasks[0]),
        (EntityKind::Task, 9999),
        (EntityKind::SubCategory, board.subs[2]),
        (EntityKind::Project, 8888),
    ];
    let outcome = deletion::bulk_permanently_delete(&board.db, &items);

    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failed.len(), 2);
    assert!(outcome.failed.iter().any(|f| f.id == 9999));
    assert!(outcome.failed.iter().any(|f| f.id == 8888));

    assert!(board.db.get_task(board.tasks[0]).unwrap().is_none());
    assert!(board.db.get_sub_category(board.subs[2]).unwrap().is_none());
}
