use uuid::Uuid;

use crate::{
    error::AppError,
    recipes::{dto::CreateRecipeRequest, repo_types::NewRecipe},
};

pub const MIN_INSTRUCTIONS_CHARS: usize = 50;

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validates a recipe payload for `user_id`. Missing fields short-circuit;
/// value problems are reported together.
pub fn prepare_recipe(req: CreateRecipeRequest, user_id: Uuid) -> Result<NewRecipe, AppError> {
    let (Some(title), Some(instructions), Some(minutes)) = (
        present(req.title),
        present(req.instructions),
        req.minutes_to_complete,
    ) else {
        return Err(AppError::Unprocessable("Missing required fields".into()));
    };

    let mut errors = Vec::new();
    if instructions.chars().count() < MIN_INSTRUCTIONS_CHARS {
        errors.push(format!(
            "Instructions must be at least {MIN_INSTRUCTIONS_CHARS} characters long."
        ));
    }
    let minutes_to_complete = match i32::try_from(minutes) {
        Ok(m) if m > 0 => m,
        _ => {
            errors.push("Minutes to complete must be a positive number.".to_string());
            0
        }
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(NewRecipe {
        title,
        instructions,
        minutes_to_complete,
        user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "Whisk the eggs, fold in the flour, and bake for forty minutes at 180C.";

    fn req(title: Option<&str>, instructions: Option<&str>, minutes: Option<i64>) -> CreateRecipeRequest {
        CreateRecipeRequest {
            title: title.map(Into::into),
            instructions: instructions.map(Into::into),
            minutes_to_complete: minutes,
        }
    }

    #[test]
    fn accepts_complete_recipe() {
        let owner = Uuid::new_v4();
        let new = prepare_recipe(req(Some("Sponge"), Some(LONG), Some(40)), owner).unwrap();
        assert_eq!(new.title, "Sponge");
        assert_eq!(new.minutes_to_complete, 40);
        assert_eq!(new.user_id, owner);
    }

    #[test]
    fn missing_or_blank_fields() {
        for r in [
            req(None, Some(LONG), Some(10)),
            req(Some("  "), Some(LONG), Some(10)),
            req(Some("Soup"), None, Some(10)),
            req(Some("Soup"), Some(LONG), None),
        ] {
            let err = prepare_recipe(r, Uuid::new_v4()).unwrap_err();
            assert!(matches!(err, AppError::Unprocessable(ref m) if m == "Missing required fields"));
        }
    }

    #[test]
    fn short_instructions_rejected() {
        let err = prepare_recipe(req(Some("Toast"), Some("Toast bread."), Some(2)), Uuid::new_v4())
            .unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(
                errors,
                vec!["Instructions must be at least 50 characters long.".to_string()]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 49 two-byte characters: 98 bytes but still too short.
        let text = "é".repeat(49);
        assert!(prepare_recipe(req(Some("Crêpe"), Some(&text), Some(5)), Uuid::new_v4()).is_err());
        let text = "é".repeat(50);
        assert!(prepare_recipe(req(Some("Crêpe"), Some(&text), Some(5)), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn minutes_must_be_positive_and_fit() {
        for minutes in [0, -5, i64::from(i32::MAX) + 1] {
            let err = prepare_recipe(req(Some("Stew"), Some(LONG), Some(minutes)), Uuid::new_v4())
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn reports_every_value_problem() {
        let err = prepare_recipe(req(Some("Stew"), Some("short"), Some(0)), Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.len() == 2));
    }
}
