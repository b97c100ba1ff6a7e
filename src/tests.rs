#[cfg(test)]
mod integration_tests {
    use crate::cli::commands::{
        add_company_profile, delete_user, init_database, list_users, login, register_company,
        register_customer, show_user,
    };
    use crate::config::{connect_database, AppState};
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::{
        init_test_tracing, setup_test_app_state, test_config, PASSWORD,
    };
    use chrono::NaiveDate;
    use model::entities::company::ServiceCategory;

    async fn register_alice(state: &AppState) -> i32 {
        let response = register_customer(
            state,
            "alice".to_string(),
            "a@x.com".to_string(),
            NaiveDate::from_ymd_opt(1990, 1, 1),
            PASSWORD.to_string(),
            PASSWORD.to_string(),
        )
        .await
        .expect("Failed to register alice");
        response.data.user.id
    }

    #[tokio::test]
    async fn test_register_customer() {
        let _guard = init_test_tracing();
        let state = setup_test_app_state().await;

        let response = register_customer(
            &state,
            "alice".to_string(),
            "a@x.com".to_string(),
            NaiveDate::from_ymd_opt(1990, 1, 1),
            PASSWORD.to_string(),
            PASSWORD.to_string(),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.message, "Customer registered successfully");

        let registration = response.data;
        assert_eq!(registration.user.username, "alice");
        assert_eq!(registration.user.email, "a@x.com");
        assert!(registration.user.is_customer);
        assert!(!registration.user.is_company);
        assert_eq!(registration.customer.user_id, registration.user.id);
        assert_eq!(registration.customer.date_of_birth, NaiveDate::from_ymd_opt(1990, 1, 1));
        assert_eq!(registration.customer.address, None);
        assert_eq!(registration.customer.phone_number, None);
    }

    #[tokio::test]
    async fn test_register_customer_with_taken_email() {
        let state = setup_test_app_state().await;
        register_alice(&state).await;

        let error = register_customer(
            &state,
            "alice2".to_string(),
            "a@x.com".to_string(),
            None,
            PASSWORD.to_string(),
            PASSWORD.to_string(),
        )
        .await
        .unwrap_err();

        assert!(!error.success);
        assert_eq!(error.code, "VALIDATION_ERROR");
        let fields = error.fields.expect("field errors");
        assert!(fields.has_code("email", "duplicate_email"));
        assert_eq!(fields.get("email")[0].message, "a@x.com is already taken.");

        let users = list_users(&state).await.unwrap().data;
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_error_response_serializes_field_map() {
        let state = setup_test_app_state().await;

        let error = register_customer(
            &state,
            "bob".to_string(),
            "b@x.com".to_string(),
            None,
            PASSWORD.to_string(),
            "different".to_string(),
        )
        .await
        .unwrap_err();

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["fields"]["password2"][0]["code"], "password_mismatch");
        assert_eq!(
            json["fields"]["password2"][0]["message"],
            "The two password fields didn't match."
        );
    }

    #[tokio::test]
    async fn test_login_updates_last_login() {
        let state = setup_test_app_state().await;
        let user_id = register_alice(&state).await;

        let before = show_user(&state, user_id).await.unwrap().data;
        assert!(before.user.last_login.is_none());

        let response = login(&state, "a@x.com".to_string(), PASSWORD.to_string())
            .await
            .unwrap();
        assert_eq!(response.data.id, user_id);
        assert!(response.data.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let state = setup_test_app_state().await;
        register_alice(&state).await;

        let error = login(&state, "a@x.com".to_string(), "wrong".to_string())
            .await
            .unwrap_err();

        assert_eq!(error.code, "VALIDATION_ERROR");
        let fields = error.fields.unwrap();
        assert_eq!(fields.non_field_errors()[0].code, "invalid_login");
    }

    #[tokio::test]
    async fn test_company_registration_and_profile() {
        let state = setup_test_app_state().await;

        let user = register_company(
            &state,
            "acme".to_string(),
            PASSWORD.to_string(),
            PASSWORD.to_string(),
        )
        .await
        .unwrap()
        .data;
        assert_eq!(user.email, "");
        assert!(!user.is_company);
        assert!(!user.is_customer);

        let detail = show_user(&state, user.id).await.unwrap().data;
        assert!(detail.company.is_none());
        assert!(detail.customer.is_none());

        let company = add_company_profile(&state, user.id, ServiceCategory::Plumbing, 4)
            .await
            .unwrap()
            .data;
        assert_eq!(company.field, "Plumbing");
        assert_eq!(company.rating, 4);

        let detail = show_user(&state, user.id).await.unwrap().data;
        assert_eq!(detail.company.unwrap().rating, 4);
    }

    #[tokio::test]
    async fn test_company_profile_rating_out_of_range() {
        let state = setup_test_app_state().await;
        let user_id = register_alice(&state).await;

        let error = add_company_profile(&state, user_id, ServiceCategory::Electricity, 6)
            .await
            .unwrap_err();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.fields.unwrap().has_code("rating", "range"));

        let error = add_company_profile(&state, 999, ServiceCategory::Electricity, 3)
            .await
            .unwrap_err();
        assert_eq!(error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_user_removes_customer_record() {
        let state = setup_test_app_state().await;
        let user_id = register_alice(&state).await;

        let response: ApiResponse<()> = delete_user(&state, user_id).await.unwrap();
        assert!(response.success);

        assert!(state.store.customer_profile(user_id).await.unwrap().is_none());
        assert_eq!(show_user(&state, user_id).await.unwrap_err().code, "NOT_FOUND");
        assert_eq!(delete_user(&state, user_id).await.unwrap_err().code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_init_database_on_file() {
        let dir = std::env::temp_dir().join(format!("homeservices-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.join("accounts.db").display());

        init_database(&url).await.unwrap();
        // Migrations are idempotent
        init_database(&url).await.unwrap();

        let db = connect_database(&url).await.unwrap();
        let state = AppState::new(db, &test_config());
        assert!(list_users(&state).await.unwrap().data.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
