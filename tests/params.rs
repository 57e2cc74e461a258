use campus_classifieds_api::routes::params::{ItemQuery, Pagination};

#[test]
fn pagination_defaults_and_bounds() {
    assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    let p = Pagination {
        page: Some(0),
        per_page: Some(1000),
    };
    assert_eq!(p.normalize(), (1, 100, 0));
    let p = Pagination {
        page: Some(3),
        per_page: Some(10),
    };
    assert_eq!(p.normalize(), (3, 10, 20));
}

#[test]
fn huge_page_numbers_saturate_the_offset() {
    let p = Pagination {
        page: Some(i64::MAX),
        per_page: Some(100),
    };
    let (page, per_page, offset) = p.normalize();
    assert_eq!(page, i64::MAX);
    assert_eq!(per_page, 100);
    assert_eq!(offset, i64::MAX);

    let query = ItemQuery {
        page: Some(i64::MAX),
        per_page: Some(i64::MAX),
        ..Default::default()
    };
    assert_eq!(query.pagination().normalize().2, i64::MAX);
}
