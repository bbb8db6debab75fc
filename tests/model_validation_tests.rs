use chrono::{NaiveDate, Utc};
use newsnotes::models::{
    Comment, CommentFormContext, CredentialsForm, FormErrors, News, NewsDetailPage,
    NewsWithComments, NoteForm, User,
};
use uuid::Uuid;

// --- Tests ---

#[test]
fn test_user_password_hash_is_never_serialized() {
    let user = User {
        id: Uuid::new_v4(),
        username: "Автор".to_string(),
        password_hash: "$argon2id$v=19$secret".to_string(),
        created_at: Utc::now(),
    };

    let json_output = serde_json::to_string(&user).unwrap();

    assert!(json_output.contains(r#""username":"Автор""#));
    assert!(!json_output.contains("password_hash"));
    assert!(!json_output.contains("argon2"));
}

#[test]
fn test_credentials_form_hides_password() {
    let form = CredentialsForm {
        username: "Автор".to_string(),
        password: "hunter2-hunter2".to_string(),
    };

    assert!(!serde_json::to_string(&form).unwrap().contains("hunter2"));
    assert!(!format!("{form:?}").contains("hunter2"));
}

#[test]
fn test_news_detail_flattens_news_fields() {
    // Mirrors a template reading `news.title` and `news.comment_set`.
    let page = NewsDetailPage {
        news: NewsWithComments {
            news: News {
                id: 1,
                title: "Заголовок".to_string(),
                text: "Новость".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            },
            comment_set: vec![Comment::default()],
        },
        form: None,
    };

    let value = serde_json::to_value(&page).unwrap();

    assert_eq!(value["news"]["title"], "Заголовок");
    assert_eq!(value["news"]["date"], "2024-01-02");
    assert_eq!(value["news"]["comment_set"].as_array().unwrap().len(), 1);
    // Anonymous readers get no form key at all.
    assert!(value.get("form").is_none());
}

#[test]
fn test_form_errors_serialize_as_plain_map() {
    let mut errors = FormErrors::default();
    errors.add("text", "Не ругайтесь!");
    errors.add(FormErrors::NON_FIELD, "общая ошибка");

    let context = CommentFormContext {
        errors,
        ..CommentFormContext::default()
    };
    let value = serde_json::to_value(&context).unwrap();

    assert_eq!(value["errors"]["text"][0], "Не ругайтесь!");
    assert_eq!(value["errors"]["__all__"][0], "общая ошибка");
    assert_eq!(value["data"]["text"], "");
}

#[test]
fn test_note_form_missing_fields_default_to_empty() {
    let form: NoteForm = serde_json::from_str(r#"{"title":"Заголовок"}"#).unwrap();

    assert_eq!(form.title, "Заголовок");
    assert!(form.text.is_empty());
    assert!(form.slug.is_empty());
}
