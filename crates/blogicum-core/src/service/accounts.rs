use super::{BlogService, Submission};
use crate::domain::{NewUser, User, UserId};
use crate::error::DomainError;
use crate::forms::{FormErrors, ProfileForm, RegistrationForm};
use crate::ports::{BaseRepository, PasswordService};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

impl BlogService {
    /// The signed-in user's own record.
    pub async fn current_user(&self, user_id: UserId) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))
    }

    /// Update the signed-in user's profile fields.
    pub async fn edit_profile(
        &self,
        user_id: UserId,
        form: &ProfileForm,
    ) -> Result<Submission<User>, DomainError> {
        let user = self.current_user(user_id).await?;
        let clean = match form.clean() {
            Ok(clean) => clean,
            Err(errors) => return Ok(Submission::Invalid(errors)),
        };

        if clean.username != user.username && self.username_taken(&clean.username).await? {
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return Ok(Submission::Invalid(errors));
        }

        let updated = self
            .repos
            .users
            .update(User {
                first_name: clean.first_name,
                last_name: clean.last_name,
                username: clean.username,
                email: clean.email,
                bio: clean.bio,
                ..user
            })
            .await?;

        tracing::info!(user_id, "Profile updated");
        Ok(Submission::Saved(updated))
    }

    /// Create an account.
    pub async fn register(
        &self,
        form: &RegistrationForm,
        passwords: &dyn PasswordService,
    ) -> Result<Submission<User>, DomainError> {
        let (username, email) = match form.clean() {
            Ok(fields) => fields,
            Err(errors) => return Ok(Submission::Invalid(errors)),
        };
        if self.username_taken(&username).await? {
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return Ok(Submission::Invalid(errors));
        }

        let password_hash = passwords
            .hash(&form.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let user = self
            .repos
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(Submission::Saved(user))
    }

    /// The user whose credentials these are, if any.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        passwords: &dyn PasswordService,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.repos.users.find_by_username(username.trim()).await? else {
            return Ok(None);
        };
        let valid = passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(valid.then_some(user))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.repos.users.find_by_username(username).await?.is_some())
    }
}
