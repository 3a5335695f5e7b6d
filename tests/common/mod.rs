//! Shared fixtures: an in-memory store, token minting and app builders

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use library_server::{
    api,
    auth::{Claims, RealmAccess, TokenVerifier},
    config::{AppConfig, SearchConfig},
    error::{AppError, AppResult},
    models::{
        book::{Book, BookSortKey, BookWithLoanStatus},
        loan::{Loan, LoanWithBook},
        page::SearchRequest,
        user::{User, UserSortKey},
    },
    repository::{BookStore, LoanStore, Repository, UserStore},
    services::Services,
    AppState,
};

pub const SECRET: &str = "integration-test-secret";
pub const CLEAN_CODE: &str = "9780132350884";

#[derive(Default)]
struct Tables {
    books: Vec<Book>,
    users: Vec<User>,
    loans: Vec<Loan>,
}

/// Store keeping all three tables behind one lock, so the open-loan check
/// and insert happen atomically like the conditional insert in PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the demo catalog and readers
    pub fn seeded() -> Self {
        let store = Self::new();
        let catalog = [
            (CLEAN_CODE, "Clean Code", "Robert C. Martin"),
            ("9780201633610", "Design Patterns", "Erich Gamma"),
            ("9780134757599", "Refactoring", "Martin Fowler"),
            ("9781593278281", "The Rust Programming Language", "Steve Klabnik"),
            ("9780596007126", "Head First Design Patterns", "Eric Freeman"),
            ("9783836217408", "Java ist auch eine Insel", "Christian Ullenboom"),
        ];
        for (isbn, title, author) in catalog {
            store.add_book(isbn, title, author);
        }
        store.add_user("demo_user_1", Some("Demo"), Some("User One"));
        store.add_user("demo_user_2", Some("Demo"), Some("User Two"));
        store.add_user("librarian", Some("Libby"), Some("Rarian"));
        store
    }

    pub fn add_book(&self, isbn: &str, title: &str, author: &str) -> i64 {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.books.len() as i64 + 1;
        tables.books.push(Book {
            id,
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            published_at: None,
            publisher: None,
            language: None,
            description: None,
            pages: None,
        });
        id
    }

    pub fn add_user(&self, username: &str, firstname: Option<&str>, lastname: Option<&str>) -> i64 {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.users.len() as i64 + 1;
        tables.users.push(User {
            id,
            username: username.to_string(),
            firstname: firstname.map(str::to_string),
            lastname: lastname.map(str::to_string),
            email: Some(format!("{}@example.org", username)),
        });
        id
    }

    pub fn open_loans_for_book(&self, isbn: &str) -> usize {
        let tables = self.tables.lock().unwrap();
        let Some(book) = tables.books.iter().find(|b| b.isbn == isbn) else {
            return 0;
        };
        tables
            .loans
            .iter()
            .filter(|l| l.book_id == book.id && l.is_open())
            .count()
    }
}

fn with_status(tables: &Tables, book: &Book) -> BookWithLoanStatus {
    let open = tables
        .loans
        .iter()
        .find(|l| l.book_id == book.id && l.is_open());
    BookWithLoanStatus {
        book: book.clone(),
        loan_id: open.map(|l| l.id),
        borrower_id: open.map(|l| l.user_id),
        borrowed_at: open.map(|l| l.borrowed_at),
    }
}

/// Case-insensitive substring match on title, author or ISBN, like the ILIKE filter
pub fn book_matches(book: &Book, filter: &str) -> bool {
    let needle = filter.to_lowercase();
    [&book.title, &book.author, &book.isbn]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Case-insensitive substring match on any user name or email column
pub fn user_matches(user: &User, filter: &str) -> bool {
    let needle = filter.to_lowercase();
    [
        Some(user.username.as_str()),
        user.firstname.as_deref(),
        user.lastname.as_deref(),
        user.email.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn book_sort_key<'a>(sort: &BookSortKey, book: &'a Book) -> &'a str {
    match sort {
        BookSortKey::Title => &book.title,
        BookSortKey::Author => &book.author,
        BookSortKey::Isbn => &book.isbn,
    }
}

fn user_sort_key<'a>(sort: &UserSortKey, user: &'a User) -> Option<&'a str> {
    match sort {
        UserSortKey::UserName => Some(user.username.as_str()),
        UserSortKey::FirstName => user.firstname.as_deref(),
        UserSortKey::LastName => user.lastname.as_deref(),
        UserSortKey::Email => user.email.as_deref(),
    }
}

fn page_of<T>(mut rows: Vec<T>, offset: i64, size: i64) -> Vec<T> {
    let offset = offset.min(rows.len() as i64) as usize;
    rows.drain(..offset);
    rows.truncate(size as usize);
    rows
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<BookWithLoanStatus>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .books
            .iter()
            .find(|b| b.isbn == isbn)
            .map(|b| with_status(&tables, b)))
    }

    async fn search(
        &self,
        request: &SearchRequest<BookSortKey>,
    ) -> AppResult<(Vec<BookWithLoanStatus>, i64)> {
        let tables = self.tables.lock().unwrap();
        let mut matching: Vec<&Book> = tables
            .books
            .iter()
            .filter(|b| request.filter.as_deref().map_or(true, |f| book_matches(b, f)))
            .collect();
        matching.sort_by(|a, b| {
            book_sort_key(&request.sort, a)
                .cmp(book_sort_key(&request.sort, b))
                .then(a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        let rows = matching
            .into_iter()
            .map(|b| with_status(&tables, b))
            .collect();
        Ok((page_of(rows, request.page.offset(), request.page.size()), total))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn search(&self, request: &SearchRequest<UserSortKey>) -> AppResult<(Vec<User>, i64)> {
        let tables = self.tables.lock().unwrap();
        let mut matching: Vec<User> = tables
            .users
            .iter()
            .filter(|u| request.filter.as_deref().map_or(true, |f| user_matches(u, f)))
            .cloned()
            .collect();
        // NULLS LAST, then id
        matching.sort_by(|a, b| {
            let (ka, kb) = (user_sort_key(&request.sort, a), user_sort_key(&request.sort, b));
            ka.is_none()
                .cmp(&kb.is_none())
                .then(ka.cmp(&kb))
                .then(a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        Ok((page_of(matching, request.page.offset(), request.page.size()), total))
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Loan>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.loans.iter().find(|l| l.id == id).cloned())
    }

    async fn create_open(
        &self,
        user_id: i64,
        book_id: i64,
        borrowed_at: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let mut tables = self.tables.lock().unwrap();
        if tables.loans.iter().any(|l| l.book_id == book_id && l.is_open()) {
            return Err(AppError::Conflict("Book is already borrowed".to_string()));
        }
        let loan = Loan {
            id: tables.loans.len() as i64 + 1,
            user_id,
            book_id,
            borrowed_at,
            returned_at: None,
        };
        tables.loans.push(loan.clone());
        Ok(loan)
    }

    async fn close(&self, loan_id: i64, returned_at: DateTime<Utc>) -> AppResult<Loan> {
        let mut tables = self.tables.lock().unwrap();
        let loan = tables
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;
        if !loan.is_open() {
            return Err(AppError::Conflict("Loan already returned".to_string()));
        }
        loan.returned_at = Some(returned_at);
        Ok(loan.clone())
    }

    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<LoanWithBook>> {
        let tables = self.tables.lock().unwrap();
        let mut loans: Vec<LoanWithBook> = tables
            .loans
            .iter()
            .filter(|l| l.user_id == user_id)
            .filter_map(|l| {
                tables
                    .books
                    .iter()
                    .find(|b| b.id == l.book_id)
                    .map(|b| LoanWithBook {
                        loan: l.clone(),
                        book: b.clone(),
                    })
            })
            .collect();
        loans.sort_by(|a, b| {
            b.loan
                .borrowed_at
                .cmp(&a.loan.borrowed_at)
                .then(b.loan.id.cmp(&a.loan.id))
        });
        Ok(loans)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub fn repository(store: Arc<MemoryStore>) -> Repository {
    Repository::from_stores(store.clone(), store.clone(), store)
}

pub fn services(store: Arc<MemoryStore>) -> Services {
    Services::new(repository(store), SearchConfig::default())
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config
}

pub fn app_state(store: Arc<MemoryStore>) -> AppState {
    let config = test_config();
    let verifier = TokenVerifier::new(&config.auth).unwrap();
    AppState {
        config: Arc::new(config),
        services: Arc::new(services(store)),
        verifier: Arc::new(verifier),
    }
}

pub fn app(store: Arc<MemoryStore>) -> Router {
    api::router(app_state(store))
}

/// HS256 token as the identity provider would issue it
pub fn token(username: &str, roles: &[&str]) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: format!("sub-{}", username),
        preferred_username: Some(username.to_string()),
        realm_access: RealmAccess {
            roles: roles.iter().map(|r| r.to_string()).collect(),
        },
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn librarian_token() -> String {
    token("librarian", &["LIBRARIAN"])
}
