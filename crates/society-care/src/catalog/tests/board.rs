use super::common::*;

use crate::catalog::domain::{CategoryId, NewCategory, SortOrder};
use crate::catalog::{CategoryBoard, CategoryOperation};
use crate::response::Response;

fn sample_board() -> (
    CategoryBoard<MemoryCategories>,
    std::sync::Arc<MemoryCategories>,
) {
    let repository = MemoryCategories::with(vec![
        ("plumbing", vec!["Leak", "Blocked drain"]),
        ("Electrical", vec!["Wiring"]),
        ("carpentry", vec![]),
    ]);
    (CategoryBoard::new(repository.clone()), repository)
}

#[tokio::test]
async fn fetch_sorts_by_case_folded_name() {
    let (board, _) = sample_board();
    let result = board.fetch_categories().await;

    assert_eq!(result, Response::Success(()));
    assert_eq!(names(&board), vec!["carpentry", "Electrical", "plumbing"]);
    assert_eq!(board.snapshot().order, SortOrder::Ascending);
}

#[tokio::test]
async fn toggling_twice_restores_ascending_order() {
    let (board, _) = sample_board();
    board.fetch_categories().await;
    let ascending = names(&board);

    assert_eq!(board.toggle_sort_categories(), SortOrder::Descending);
    assert_eq!(names(&board), vec!["plumbing", "Electrical", "carpentry"]);

    assert_eq!(board.toggle_sort_categories(), SortOrder::Ascending);
    assert_eq!(names(&board), ascending);
}

#[tokio::test]
async fn moves_are_bounded_and_swap_neighbours() {
    let (board, _) = sample_board();
    board.fetch_categories().await;
    let before = names(&board);

    assert!(!board.move_category_up(0));
    assert!(!board.move_category_down(before.len() - 1));
    assert!(!board.move_category_up(17));
    assert!(!board.move_category_down(17));
    assert!(!board.move_category_down(usize::MAX));
    assert_eq!(names(&board), before);

    assert!(board.move_category_down(0));
    assert_eq!(names(&board), vec!["Electrical", "carpentry", "plumbing"]);

    assert!(board.move_category_up(2));
    assert_eq!(names(&board), vec!["Electrical", "plumbing", "carpentry"]);
}

#[test]
fn moves_on_an_empty_board_do_nothing() {
    let (board, _) = sample_board();
    assert!(!board.move_category_down(0));
    assert!(!board.move_category_down(usize::MAX));
    assert!(!board.move_category_up(usize::MAX));
}

#[tokio::test]
async fn manual_order_is_discarded_by_the_next_fetch() {
    let (board, _) = sample_board();
    board.fetch_categories().await;
    board.move_category_down(0);

    board.fetch_categories().await;
    assert_eq!(names(&board), vec!["carpentry", "Electrical", "plumbing"]);
}

#[tokio::test]
async fn added_category_comes_back_with_its_stored_id() {
    let (board, repository) = sample_board();
    board.fetch_categories().await;

    let result = board
        .add_category(NewCategory {
            name: "  Painting ".to_string(),
            subcategories: vec!["Touch-up".to_string()],
        })
        .await;
    assert_eq!(result, Response::Success(()));

    board.fetch_categories().await;
    let snapshot = board.snapshot();
    let painting = snapshot
        .categories
        .iter()
        .find(|category| category.name == "Painting")
        .expect("new category listed");
    assert_eq!(painting.id, CategoryId("cat-4".to_string()));
    assert!(repository.stored("cat-4").is_some());
}

#[tokio::test]
async fn added_subcategory_is_listed_after_fetch() {
    let (board, _) = sample_board();

    let result = board
        .add_subcategory(CategoryId("cat-1".to_string()), "Plumbing")
        .await;
    assert_eq!(result, Response::Success(()));

    board.fetch_categories().await;
    let snapshot = board.snapshot();
    let category = snapshot
        .categories
        .iter()
        .find(|category| category.id.0 == "cat-1")
        .expect("cat-1 listed");
    assert!(category.has_subcategory("Plumbing"));
}

#[tokio::test]
async fn subcategory_rename_and_delete_match_exact_names() {
    let (board, repository) = sample_board();
    let id = CategoryId("cat-1".to_string());

    let missing = board.update_subcategory(id.clone(), "leak", "Pipe leak").await;
    assert!(missing
        .error_message()
        .is_some_and(|message| message.contains("'leak' not found")));

    let renamed = board.update_subcategory(id.clone(), "Leak", "Pipe leak").await;
    assert_eq!(renamed, Response::Success(()));
    assert_eq!(
        repository.stored("cat-1").expect("stored").subcategories,
        vec!["Pipe leak", "Blocked drain"]
    );

    board.delete_subcategory(id, "Blocked drain").await;
    assert_eq!(
        repository.stored("cat-1").expect("stored").subcategories,
        vec!["Pipe leak"]
    );
}

#[tokio::test]
async fn blank_names_are_rejected_before_the_backend() {
    let (board, repository) = sample_board();

    let result = board
        .add_category(NewCategory {
            name: "   ".to_string(),
            subcategories: Vec::new(),
        })
        .await;

    assert_eq!(
        result.error_message(),
        Some("category name must not be blank")
    );
    assert!(repository.stored("cat-4").is_none());
    assert!(board.operation(CategoryOperation::Fetch).is_none());
}

#[tokio::test]
async fn failures_leave_fetched_list_and_other_operations_alone() {
    let (board, repository) = sample_board();
    board.fetch_categories().await;
    board
        .add_subcategory(CategoryId("cat-2".to_string()), "Fuse box")
        .await;
    let before = board.snapshot().categories;

    repository.go_offline();
    let result = board.delete_category(CategoryId("cat-3".to_string())).await;
    assert!(result
        .error_message()
        .is_some_and(|message| message.contains("offline")));

    let refetch = board.fetch_categories().await;
    assert!(refetch.error_message().is_some());

    let snapshot = board.snapshot();
    assert_eq!(snapshot.categories, before);
    assert_eq!(
        board.operation(CategoryOperation::AddSubcategory),
        Some(Response::Success(()))
    );
    assert!(board
        .operation(CategoryOperation::DeleteCategory)
        .is_some_and(|response| response.error_message().is_some()));
}

#[tokio::test]
async fn deleting_an_unknown_category_is_an_error() {
    let (board, _) = sample_board();
    let result = board.delete_category(CategoryId("cat-99".to_string())).await;
    assert_eq!(result.error_message(), Some("record not found"));
}
