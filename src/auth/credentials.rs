use std::net::IpAddr;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::AppError;

const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// A sign-in payload that passed validation. The email is normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl TryFrom<SignInRequest> for Credentials {
    type Error = AppError;

    fn try_from(req: SignInRequest) -> Result<Self, Self::Error> {
        let email = normalize_email(&req.email);
        if email.is_empty() {
            return Err(AppError::BadRequest("Email is required".into()));
        }
        if email.len() > MAX_EMAIL_LEN || !is_valid_email(&email) {
            return Err(AppError::BadRequest("Invalid email address".into()));
        }

        let password_len = req.password.chars().count();
        if password_len < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if password_len > MAX_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at most {} characters",
                MAX_PASSWORD_LEN
            )));
        }

        Ok(Credentials {
            email,
            password: req.password,
        })
    }
}

impl Credentials {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        // Evaluate both so a wrong email costs the same as a wrong password
        let email_ok = constant_time_eq(&self.email, email);
        let password_ok = constant_time_eq(&self.password, password);
        email_ok & password_ok
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

/// Which request attributes make up the lockout key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutScope {
    Ip,
    Account,
    Composite,
}

impl LockoutScope {
    pub fn key(&self, ip: IpAddr, email: &str) -> String {
        match self {
            LockoutScope::Ip => ip.to_string(),
            LockoutScope::Account => email.to_string(),
            LockoutScope::Composite => format!("{}|{}", ip, email),
        }
    }
}

impl FromStr for LockoutScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ip" => Ok(LockoutScope::Ip),
            "account" => Ok(LockoutScope::Account),
            "composite" => Ok(LockoutScope::Composite),
            other => Err(anyhow::anyhow!(
                "Unsupported lockout scope: '{}'. Supported: ip, account, composite",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn request(email: &str, password: &str) -> SignInRequest {
        SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_credentials_are_normalized() {
        let creds = Credentials::try_from(request("  Dean@Campus.EDU ", "secret123")).unwrap();
        assert_eq!(creds.email, "dean@campus.edu");
        assert_eq!(creds.password, "secret123");
    }

    #[test]
    fn test_invalid_emails() {
        for email in [
            "",
            "   ",
            "no-at-sign",
            "@campus.edu",
            "dean@",
            "dean@campus",
            "dean@campus.",
            "dean@@campus.edu",
            "de an@campus.edu",
        ] {
            assert!(
                Credentials::try_from(request(email, "secret123")).is_err(),
                "accepted {:?}",
                email
            );
        }
        let long = format!("{}@campus.edu", "a".repeat(250));
        assert!(Credentials::try_from(request(&long, "secret123")).is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(Credentials::try_from(request("dean@campus.edu", "12345")).is_err());
        assert!(Credentials::try_from(request("dean@campus.edu", "123456")).is_ok());
        assert!(Credentials::try_from(request("dean@campus.edu", &"x".repeat(129))).is_err());
    }

    #[test]
    fn test_matches() {
        let creds = Credentials::try_from(request("dean@campus.edu", "secret123")).unwrap();
        assert!(creds.matches("dean@campus.edu", "secret123"));
        assert!(!creds.matches("dean@campus.edu", "secret124"));
        assert!(!creds.matches("dean@campus.edu", "secret1234"));
        assert!(!creds.matches("dean@campus.org", "secret123"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("", ""));
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
    }

    #[test]
    fn test_lockout_keys() {
        let ip = IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(LockoutScope::Ip.key(ip, "dean@campus.edu"), "10.1.2.3");
        assert_eq!(
            LockoutScope::Account.key(ip, "dean@campus.edu"),
            "dean@campus.edu"
        );
        assert_eq!(
            LockoutScope::Composite.key(ip, "dean@campus.edu"),
            "10.1.2.3|dean@campus.edu"
        );
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("IP".parse::<LockoutScope>().unwrap(), LockoutScope::Ip);
        assert_eq!(
            "account".parse::<LockoutScope>().unwrap(),
            LockoutScope::Account
        );
        assert_eq!(
            "composite".parse::<LockoutScope>().unwrap(),
            LockoutScope::Composite
        );
        assert!("user".parse::<LockoutScope>().is_err());
    }
}
