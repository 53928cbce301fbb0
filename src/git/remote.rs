//! Remote synchronisation.
//!
//! Only SSH remotes are trusted. URLs are classified before connecting, and
//! the certificate callback accepts nothing but SSH host keys, so an HTTPS
//! remote is refused before any ref data reaches the repository.
//! Credentials always come from the SSH agent.

use std::cell::RefCell;

use git2::cert::Cert;
use git2::{
    AutotagOption, CertificateCheckStatus, Cred, CredentialType, Direction, FetchOptions, Remote,
    RemoteCallbacks,
};

use crate::git::error::{GitError, GitResult};
use crate::git::repository::RepositoryHandle;
use crate::git::types::CommitId;

/// Username used for SSH when the URL carries none.
const DEFAULT_SSH_USER: &str = "git";

/// How a remote URL is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    /// `ssh://...` or scp-style `user@host:path`
    Ssh,
    /// a filesystem path or `file://` URL, no network involved
    Local,
    /// `http://` or `https://`
    Http,
    /// any other scheme (`git://`, ...)
    Other(String),
}

impl TransportKind {
    /// Classify a remote URL.
    pub fn classify(url: &str) -> Self {
        if let Some((scheme, _)) = url.split_once("://") {
            return match scheme.to_ascii_lowercase().as_str() {
                "ssh" | "git+ssh" | "ssh+git" => TransportKind::Ssh,
                "file" => TransportKind::Local,
                "http" | "https" => TransportKind::Http,
                other => TransportKind::Other(other.to_string()),
            };
        }

        // scp-like syntax: a colon before the first slash, and more than a
        // single drive letter in front of it
        match (url.find(':'), url.find('/')) {
            (Some(colon), slash) if colon > 1 && slash.map_or(true, |s| colon < s) => {
                TransportKind::Ssh
            }
            _ => TransportKind::Local,
        }
    }

    /// Whether fetching over this transport is allowed at all.
    pub fn is_trusted(&self) -> bool {
        matches!(self, TransportKind::Ssh | TransportKind::Local)
    }
}

/// Kind of certificate presented by a remote during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertKind {
    HostKey,
    X509,
    Other,
}

impl CertKind {
    fn of(cert: &Cert<'_>) -> Self {
        if cert.as_hostkey().is_some() {
            CertKind::HostKey
        } else if cert.as_x509().is_some() {
            CertKind::X509
        } else {
            CertKind::Other
        }
    }
}

/// Outcome of checking a remote's certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertVerdict {
    Accept,
    Reject(String),
}

/// Accept SSH host keys, reject everything else.
pub fn check_certificate(kind: CertKind, host: &str) -> CertVerdict {
    match kind {
        CertKind::HostKey => CertVerdict::Accept,
        CertKind::X509 => CertVerdict::Reject(format!(
            "{} presented a TLS certificate; HTTPS remotes are not supported",
            host
        )),
        CertKind::Other => CertVerdict::Reject(format!(
            "{} presented an unknown certificate type",
            host
        )),
    }
}

/// Build remote callbacks with SSH-agent credentials and the certificate
/// policy. A rejected certificate is recorded in `rejection` so the caller
/// can tell a policy violation apart from an ordinary transport failure.
fn callbacks(rejection: &RefCell<Option<String>>) -> RemoteCallbacks<'_> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, allowed| {
        if !allowed.contains(CredentialType::SSH_KEY) {
            return Err(git2::Error::from_str(
                "remote does not accept SSH key credentials",
            ));
        }
        Cred::ssh_key_from_agent(username_from_url.unwrap_or(DEFAULT_SSH_USER))
    });
    cb.certificate_check(move |cert, host| {
        apply_verdict(check_certificate(CertKind::of(cert), host), rejection)
    });
    cb
}

/// turn a verdict into the certificate callback's answer, recording the
/// reason of a rejection
fn apply_verdict(
    verdict: CertVerdict,
    rejection: &RefCell<Option<String>>,
) -> Result<CertificateCheckStatus, git2::Error> {
    match verdict {
        CertVerdict::Accept => Ok(CertificateCheckStatus::CertificateOk),
        CertVerdict::Reject(reason) => {
            let err = git2::Error::from_str(&reason);
            *rejection.borrow_mut() = Some(reason);
            Err(err)
        }
    }
}

/// map a failed connection or fetch to an error; a recorded certificate
/// rejection wins over the transport's own message
fn transport_failure(
    remote_name: &str,
    rejection: &RefCell<Option<String>>,
    err: git2::Error,
) -> GitError {
    match rejection.borrow_mut().take() {
        Some(reason) => GitError::UntrustedTransport {
            remote: remote_name.to_string(),
            reason,
        },
        None => GitError::FetchFailed {
            remote: remote_name.to_string(),
            reason: err.message().to_string(),
        },
    }
}

/// Fetch every ref and tag from `remote_name` and return the commit the
/// remote's HEAD points to.
pub fn fetch(repo: &RepositoryHandle, remote_name: &str) -> GitResult<CommitId> {
    let mut remote = repo
        .raw()
        .find_remote(remote_name)
        .map_err(|_| GitError::RemoteNotFound(remote_name.to_string()))?;

    let url = remote.url().unwrap_or_default().to_string();
    let transport = TransportKind::classify(&url);
    if !transport.is_trusted() {
        return Err(GitError::UntrustedTransport {
            remote: remote_name.to_string(),
            reason: format!("{} is not an SSH remote", url),
        });
    }

    let rejection = RefCell::new(None);
    let fetched = {
        let mut fo = FetchOptions::new();
        fo.remote_callbacks(callbacks(&rejection));
        fo.download_tags(AutotagOption::All);
        remote.fetch(&[] as &[&str], Some(&mut fo), None)
    };
    fetched.map_err(|e| transport_failure(remote_name, &rejection, e))?;

    remote_head(&mut remote, remote_name)
}

/// Find HEAD among the refs the remote advertised.
///
/// The advertisement from the fetch is normally still cached on the remote;
/// if it is not, reconnect once to list it.
fn remote_head(remote: &mut Remote<'_>, remote_name: &str) -> GitResult<CommitId> {
    let find_head = |heads: &[git2::RemoteHead<'_>]| {
        heads
            .iter()
            .find(|h| h.name() == "HEAD")
            .map(|h| CommitId::new(h.oid()))
    };

    if let Ok(heads) = remote.list() {
        if let Some(head) = find_head(heads) {
            return Ok(head);
        }
    }

    let rejection = RefCell::new(None);
    let connection = remote
        .connect_auth(Direction::Fetch, Some(callbacks(&rejection)), None)
        .map_err(|e| transport_failure(remote_name, &rejection, e))?;
    let heads = connection
        .list()
        .map_err(|_| GitError::RemoteHeadMissing(remote_name.to_string()))?;

    find_head(heads).ok_or_else(|| GitError::RemoteHeadMissing(remote_name.to_string()))
}
