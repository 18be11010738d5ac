#[derive(Debug)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }
}

pub fn validate_email_address(email: &str) -> Validity {
    let mut at_symbol_count = 0;
    let mut part_before_at_symbol_length = 0;
    let mut part_after_at_symbol_length = 0;
    let mut dot_in_part_after_at_symbol = false;

    for c in email.chars() {
        if c == '@' {
            at_symbol_count += 1;
            continue;
        }

        if c.is_whitespace() {
            return Validity::Invalid(String::from(
                "Email address cannot contain whitespace characters",
            ));
        }

        if at_symbol_count == 0 {
            part_before_at_symbol_length += 1;
        } else {
            part_after_at_symbol_length += 1;

            if c == '.' {
                dot_in_part_after_at_symbol = true;
            }
        }
    }

    if at_symbol_count != 1
        || part_before_at_symbol_length == 0
        || part_after_at_symbol_length < 3
        || !dot_in_part_after_at_symbol
        || email.ends_with('.')
    {
        return Validity::Invalid(String::from("Email address is not in a valid format"));
    }

    Validity::Valid
}

pub fn validate_username(username: &str) -> Validity {
    let char_count = username.chars().count();

    if char_count < 5 {
        return Validity::Invalid(String::from(
            "Username must contain at least 5 characters",
        ));
    }

    if char_count > 100 {
        return Validity::Invalid(String::from(
            "Username must contain no more than 100 characters",
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
    {
        return Validity::Invalid(String::from(
            "Username may only contain letters, numbers, '.', '_', and '-'",
        ));
    }

    Validity::Valid
}

pub fn validate_expense_description(description: &str) -> Validity {
    if description.chars().count() > 200 {
        return Validity::Invalid(String::from(
            "Description must contain no more than 200 characters",
        ));
    }

    Validity::Valid
}

pub fn validate_category_name(name: &str) -> Validity {
    if name.trim().is_empty() {
        return Validity::Invalid(String::from("Category name cannot be empty"));
    }

    if name.chars().count() > 100 {
        return Validity::Invalid(String::from(
            "Category name must contain no more than 100 characters",
        ));
    }

    Validity::Valid
}

pub fn validate_password(password: &str) -> Validity {
    let char_count = password.chars().count();

    if char_count < 8 {
        return Validity::Invalid(String::from(
            "Password must contain at least 8 characters",
        ));
    }

    if char_count > 40 {
        return Validity::Invalid(String::from(
            "Password must contain no more than 40 characters",
        ));
    }

    Validity::Valid
}
