//! Booking engine flow tests against an embedded database.
//! Run: cargo test -p vetbook-server --test booking_flow

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

use vetbook_server::booking::{
    AvailabilityResolver, BookingError, BookingStore, DocumentSubject, EventBus, pricing,
};
use vetbook_server::db::DbService;
use vetbook_server::db::models::{
    CageCreate, CageType, PetCreate, ReservationCreate, ReservationStatus, ServiceCategory,
    ServiceCreate, VerifyStatus,
};
use vetbook_server::db::repository::{
    CageRepository, PetRepository, RepoError, ReservationRepository, ServiceRepository,
};

struct TestEnv {
    _tmp: TempDir,
    db: Surreal<Db>,
    booking: BookingStore,
}

async fn test_env() -> TestEnv {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("test.db");
    let service = DbService::new(&db_path.to_string_lossy()).await.unwrap();
    let db = service.db.clone();
    let booking = BookingStore::new(db.clone(), EventBus::default());
    TestEnv {
        _tmp: tmp,
        db,
        booking,
    }
}

async fn seed_cage(db: &Surreal<Db>, number: &str, daily_rate: f64) -> String {
    let repo = CageRepository::new(db.clone());
    let cage = repo
        .create(CageCreate {
            cage_number: number.to_string(),
            cage_type: CageType::Medium,
            capacity: Some(2),
            daily_rate,
            status: None,
        })
        .await
        .unwrap();
    cage.id.unwrap().to_string()
}

async fn seed_service(db: &Surreal<Db>, category: ServiceCategory, price: f64) -> String {
    let repo = ServiceRepository::new(db.clone());
    let duration = match category {
        ServiceCategory::Regular => Some(30),
        ServiceCategory::Boarding => None,
    };
    let service = repo
        .create(ServiceCreate {
            name: match category {
                ServiceCategory::Regular => format!("Checkup {price}"),
                ServiceCategory::Boarding => format!("Boarding {price}"),
            },
            price,
            duration_minutes: duration,
            category,
        })
        .await
        .unwrap();
    service.id.unwrap().to_string()
}

async fn seed_pet(db: &Surreal<Db>, name: &str) -> String {
    let repo = PetRepository::new(db.clone());
    let pet = repo
        .create(PetCreate {
            client_id: "client-1".to_string(),
            name: name.to_string(),
            species: "dog".to_string(),
            breed: "aspin".to_string(),
        })
        .await
        .unwrap();
    pet.id.unwrap().to_string()
}

fn boarding_request(
    pet_ids: Vec<String>,
    service_id: &str,
    cage_id: &str,
    check_in: &str,
    check_out: &str,
) -> ReservationCreate {
    ReservationCreate {
        pet_ids,
        service_id: service_id.to_string(),
        payment_method: "GCash".to_string(),
        appointment_date: None,
        appointment_time: None,
        cage_id: Some(cage_id.to_string()),
        check_in_date: Some(check_in.to_string()),
        check_out_date: Some(check_out.to_string()),
        receipt_url: None,
        id_document_url: None,
        signature_url: None,
        notes: None,
    }
}

// =============================================================================
// Pricing
// =============================================================================

#[tokio::test]
async fn boarding_total_is_service_price_plus_stay_charge() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    let created = env
        .booking
        .create(boarding_request(
            vec![pet],
            &service,
            &cage,
            "2024-06-01",
            "2024-06-04",
        ))
        .await
        .unwrap();

    // 3 nights × 500 + 250 × 1 pet
    assert_eq!(created.total_amount, 1750.0);
    assert_eq!(created.booking.boarding_days(), Some(3));
    // GCash without a receipt starts in PENDING_PAYMENT
    assert_eq!(created.status, ReservationStatus::PendingPayment);
}

#[tokio::test]
async fn multi_pet_regular_total_is_flat_multiplier() {
    let env = test_env().await;
    let service = seed_service(&env.db, ServiceCategory::Regular, 300.0).await;
    let pets = vec![
        seed_pet(&env.db, "Rex").await,
        seed_pet(&env.db, "Luna").await,
        seed_pet(&env.db, "Milo").await,
    ];

    let created = env
        .booking
        .create(ReservationCreate {
            pet_ids: pets,
            service_id: service,
            payment_method: "Cash".to_string(),
            appointment_date: Some("2024-06-10".to_string()),
            appointment_time: Some("10:30".to_string()),
            cage_id: None,
            check_in_date: None,
            check_out_date: None,
            receipt_url: None,
            id_document_url: None,
            signature_url: None,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(created.total_amount, 900.0);
    // Cash-equivalent method skips the payment-pending stage
    assert_eq!(created.status, ReservationStatus::Pending);
    assert!(!created.booking.is_boarding());
}

#[tokio::test]
async fn persisted_total_matches_recomputed_total() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 499.99).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 123.45).await;
    let pets = vec![seed_pet(&env.db, "Rex").await, seed_pet(&env.db, "Luna").await];

    let created = env
        .booking
        .create(boarding_request(
            pets,
            &service,
            &cage,
            "2024-07-01",
            "2024-07-06",
        ))
        .await
        .unwrap();

    // Audit invariant: the stored amount is re-derivable from the
    // persisted fields alone
    let repo = ReservationRepository::new(env.db.clone());
    let stored = repo
        .find_by_id(&created.id_string())
        .await
        .unwrap()
        .unwrap();
    let recomputed = pricing::compute_total(
        123.45,
        stored.pets.len() as u32,
        Some((499.99, stored.booking.boarding_days().unwrap())),
    );
    assert_eq!(stored.total_amount, recomputed);
}

// =============================================================================
// Double-booking
// =============================================================================

#[tokio::test]
async fn concurrent_overlapping_creates_have_one_winner() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet_a = seed_pet(&env.db, "Rex").await;
    let pet_b = seed_pet(&env.db, "Luna").await;

    // Both clients saw the cage as free; ranges overlap on [06-03, 06-05)
    let req_a = boarding_request(vec![pet_a], &service, &cage, "2024-06-01", "2024-06-05");
    let req_b = boarding_request(vec![pet_b], &service, &cage, "2024-06-03", "2024-06-07");

    let (res_a, res_b) = tokio::join!(env.booking.create(req_a), env.booking.create(req_b));

    let winners = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one of the two creates may succeed");
    let loser = if res_a.is_ok() { res_b } else { res_a };
    assert!(matches!(loser, Err(BookingError::CageConflict(_))));
}

#[tokio::test]
async fn overlap_detection_matches_half_open_intervals() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    // Fixed stay on [03, 06); probe every range within the first ten days
    // of the month and check the second create succeeds exactly when the
    // half-open intervals are disjoint.
    let held = env
        .booking
        .create(boarding_request(
            vec![pet.clone()],
            &service,
            &cage,
            "2024-06-03",
            "2024-06-06",
        ))
        .await
        .unwrap();
    let (held_in, held_out) = (3, 6);

    for start in 1..10 {
        for end in (start + 1)..=10 {
            let req = boarding_request(
                vec![pet.clone()],
                &service,
                &cage,
                &format!("2024-06-{start:02}"),
                &format!("2024-06-{end:02}"),
            );
            let overlaps = held_in < end && held_out > start;
            match env.booking.create(req).await {
                Ok(probe) => {
                    assert!(!overlaps, "[{start}, {end}) must have been refused");
                    env.booking.delete(&probe.id_string()).await.unwrap();
                }
                Err(BookingError::CageConflict(_)) => {
                    assert!(overlaps, "[{start}, {end}) must have been accepted");
                }
                Err(other) => panic!("unexpected error for [{start}, {end}): {other}"),
            }
        }
    }

    env.booking.delete(&held.id_string()).await.unwrap();
}

#[tokio::test]
async fn adjacent_ranges_do_not_conflict() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet_a = seed_pet(&env.db, "Rex").await;
    let pet_b = seed_pet(&env.db, "Luna").await;

    // Half-open ranges: checkout day is free for the next check-in
    env.booking
        .create(boarding_request(
            vec![pet_a],
            &service,
            &cage,
            "2024-06-01",
            "2024-06-03",
        ))
        .await
        .unwrap();
    env.booking
        .create(boarding_request(
            vec![pet_b],
            &service,
            &cage,
            "2024-06-03",
            "2024-06-05",
        ))
        .await
        .unwrap();
}

// =============================================================================
// Availability
// =============================================================================

#[tokio::test]
async fn availability_excludes_overlapping_active_reservations() {
    let env = test_env().await;
    let cage_a = seed_cage(&env.db, "C-01", 500.0).await;
    let _cage_b = seed_cage(&env.db, "C-02", 350.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    let created = env
        .booking
        .create(boarding_request(
            vec![pet],
            &service,
            &cage_a,
            "2024-06-01",
            "2024-06-05",
        ))
        .await
        .unwrap();

    let resolver = AvailabilityResolver::new(env.db.clone());
    let check = |s: &str| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();

    // Overlapping range: only the free cage is offered
    let available = resolver
        .find_available_cages(check("2024-06-03"), check("2024-06-07"), None)
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].cage.cage_number, "C-02");
    // 4 nights × 350
    assert_eq!(available[0].total_amount, 1400.0);

    // Range starting on the checkout day is free again
    let available = resolver
        .find_available_cages(check("2024-06-05"), check("2024-06-07"), None)
        .await
        .unwrap();
    assert_eq!(available.len(), 2);

    // Cancelling releases the cage for the overlapping range too
    env.booking
        .request_transition(
            &created.id_string(),
            ReservationStatus::Cancelled,
            "front-desk",
        )
        .await
        .unwrap();
    let available = resolver
        .find_available_cages(check("2024-06-03"), check("2024-06-07"), None)
        .await
        .unwrap();
    assert_eq!(available.len(), 2);
}

#[tokio::test]
async fn zero_length_stay_is_rejected() {
    let env = test_env().await;
    let resolver = AvailabilityResolver::new(env.db.clone());
    let day = chrono::NaiveDate::parse_from_str("2024-06-01", "%Y-%m-%d").unwrap();
    let err = resolver
        .find_available_cages(day, day, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
}

// =============================================================================
// Verification gating
// =============================================================================

#[tokio::test]
async fn receipt_review_gates_in_progress() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    let mut req = boarding_request(vec![pet], &service, &cage, "2024-06-01", "2024-06-04");
    req.receipt_url = Some("https://docs/receipt.jpg".to_string());
    let created = env.booking.create(req).await.unwrap();
    // Receipt supplied up front: starts in PENDING, not PENDING_PAYMENT
    assert_eq!(created.status, ReservationStatus::Pending);
    let id = created.id_string();

    // Uploaded but unreviewed: the gate blocks service delivery
    let err = env
        .booking
        .request_transition(&id, ReservationStatus::InProgress, "front-desk")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Transition(_)));

    // Approval moves the reservation to PAID...
    let updated = env.booking.decide_receipt(&id, true, "reviewer").await.unwrap();
    assert_eq!(updated.status, ReservationStatus::Paid);
    assert_eq!(updated.receipt.status, VerifyStatus::Approved);

    // ...and the same transition now passes
    let updated = env
        .booking
        .request_transition(&id, ReservationStatus::InProgress, "front-desk")
        .await
        .unwrap();
    assert_eq!(updated.status, ReservationStatus::InProgress);
}

#[tokio::test]
async fn rejected_receipt_forces_pending_payment() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    let mut req = boarding_request(vec![pet], &service, &cage, "2024-06-01", "2024-06-04");
    req.receipt_url = Some("https://docs/receipt.jpg".to_string());
    let created = env.booking.create(req).await.unwrap();
    let id = created.id_string();

    env.booking
        .request_transition(&id, ReservationStatus::Confirmed, "front-desk")
        .await
        .unwrap();

    let updated = env.booking.decide_receipt(&id, false, "reviewer").await.unwrap();
    assert_eq!(updated.status, ReservationStatus::PendingPayment);
    assert_eq!(updated.receipt.status, VerifyStatus::Rejected);
}

#[tokio::test]
async fn document_rejection_closes_the_reservation() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    let mut req = boarding_request(vec![pet], &service, &cage, "2024-06-01", "2024-06-04");
    req.receipt_url = Some("https://docs/receipt.jpg".to_string());
    req.id_document_url = Some("https://docs/id.jpg".to_string());
    req.signature_url = Some("https://docs/sig.jpg".to_string());
    let created = env.booking.create(req).await.unwrap();
    let id = created.id_string();

    env.booking
        .decide_document(&id, DocumentSubject::Id, true, None, "reviewer")
        .await
        .unwrap();
    let updated = env
        .booking
        .decide_document(
            &id,
            DocumentSubject::Signature,
            false,
            Some("blurry image".to_string()),
            "reviewer",
        )
        .await
        .unwrap();

    assert_eq!(updated.status, ReservationStatus::Rejected);
    assert_eq!(updated.signature.status, VerifyStatus::Rejected);
    assert_eq!(
        updated.signature.rejection_reason.as_deref(),
        Some("blurry image")
    );
    // The earlier approval is untouched (gate monotonicity)
    assert_eq!(updated.id_document.status, VerifyStatus::Approved);

    // Terminal: every further transition fails
    for target in [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::InProgress,
        ReservationStatus::Completed,
    ] {
        let err = env
            .booking
            .request_transition(&id, target, "front-desk")
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Transition(_)));
    }
}

#[tokio::test]
async fn document_rejection_without_reason_changes_nothing() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    let mut req = boarding_request(vec![pet], &service, &cage, "2024-06-01", "2024-06-04");
    req.signature_url = Some("https://docs/sig.jpg".to_string());
    let created = env.booking.create(req).await.unwrap();
    let id = created.id_string();

    let err = env
        .booking
        .decide_document(&id, DocumentSubject::Signature, false, None, "reviewer")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::MissingRejectionReason));

    let repo = ReservationRepository::new(env.db.clone());
    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.signature.status, VerifyStatus::Pending);
    assert_eq!(stored.status, ReservationStatus::PendingPayment);
}

// =============================================================================
// Catalog integrity
// =============================================================================

#[tokio::test]
async fn cage_delete_is_blocked_while_reserved() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let service = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    let created = env
        .booking
        .create(boarding_request(
            vec![pet],
            &service,
            &cage,
            "2024-06-01",
            "2024-06-04",
        ))
        .await
        .unwrap();

    let repo = CageRepository::new(env.db.clone());
    let err = repo.delete(&cage).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    // Cancelled reservations no longer hold the cage
    env.booking
        .request_transition(
            &created.id_string(),
            ReservationStatus::Cancelled,
            "front-desk",
        )
        .await
        .unwrap();
    assert!(repo.delete(&cage).await.unwrap());
}

#[tokio::test]
async fn create_rejects_malformed_requests() {
    let env = test_env().await;
    let cage = seed_cage(&env.db, "C-01", 500.0).await;
    let boarding = seed_service(&env.db, ServiceCategory::Boarding, 250.0).await;
    let regular = seed_service(&env.db, ServiceCategory::Regular, 300.0).await;
    let pet = seed_pet(&env.db, "Rex").await;

    // Zero-length stay
    let err = env
        .booking
        .create(boarding_request(
            vec![pet.clone()],
            &boarding,
            &cage,
            "2024-06-01",
            "2024-06-01",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));

    // Regular service booked with a cage
    let err = env
        .booking
        .create(boarding_request(
            vec![pet.clone()],
            &regular,
            &cage,
            "2024-06-01",
            "2024-06-02",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));

    // No pets
    let err = env
        .booking
        .create(boarding_request(
            vec![],
            &boarding,
            &cage,
            "2024-06-01",
            "2024-06-02",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));

    // Unknown pet
    let err = env
        .booking
        .create(boarding_request(
            vec!["pet:doesnotexist".to_string()],
            &boarding,
            &cage,
            "2024-06-01",
            "2024-06-02",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Repo(RepoError::NotFound(_))));
}
