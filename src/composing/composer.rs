//! Template and content composition.
//!
//! # Responsibilities
//! - Drive scanner + fetcher recursively until a document is fully resolved
//! - Merge the session fragments of every fetched fragment
//! - Extract the final text and stamp the non-cacheable response header
//!
//! # Design Decisions
//! - Sibling includes at one level resolve concurrently; a fragment's own
//!   includes resolve before it contributes to the parent's session merge
//! - Any include failure (transport, non-success status, empty payload)
//!   substitutes that include's fallback and affects nothing else
//! - Assembled pages are stamped `Cache-Control: no-store,max-age=0` since
//!   composition is dynamic per request

use std::collections::HashMap;
use std::time::Duration;

use axum::http::{header, HeaderValue, Response};
use futures_util::future::{join_all, BoxFuture};

use crate::composing::composition::{Composition, ResolvedInclude};
use crate::composing::fetcher::{
    ContentFetcher, HttpClient, RecursionAwareFetcher, ValidatingContentFetcher,
};
use crate::composing::range::ContentRange;
use crate::composing::scanner::{scan, MarkupNames, ParsedDocument};
use crate::composing::step::CompositionStep;
use crate::config::schema::CompositionConfig;
use crate::session::{ResponseWithSession, SessionFragment, SessionRoot};

const NO_STORE: HeaderValue = HeaderValue::from_static("no-store,max-age=0");

/// Entry point for composing a top-level template. A trait so dispatch can
/// be exercised against a stub composer.
pub trait TemplateComposer: Send + Sync {
    fn compose_template<'a>(
        &'a self,
        response: Response<String>,
        template_path: &'a str,
    ) -> BoxFuture<'a, ResponseWithSession<String>>;
}

/// Builds a composer bound to one request's path arguments and session.
pub trait ComposerFactory: Send + Sync {
    fn build(
        &self,
        path_arguments: HashMap<String, String>,
        session: SessionRoot,
    ) -> Box<dyn TemplateComposer>;
}

/// Produces [`Composer`]s backed by the HTTP fetcher, from configuration.
pub struct HtmlComposerFactory {
    client: HttpClient,
    markup: MarkupNames,
    max_recursion: usize,
    fetch_timeout: Duration,
}

impl HtmlComposerFactory {
    pub fn from_config(config: &CompositionConfig, fetch_timeout: Duration, client: HttpClient) -> Self {
        Self {
            client,
            markup: MarkupNames::new(config.include_tag.clone(), config.content_tag.clone()),
            max_recursion: config.max_recursion,
            fetch_timeout,
        }
    }
}

impl ComposerFactory for HtmlComposerFactory {
    fn build(
        &self,
        path_arguments: HashMap<String, String>,
        session: SessionRoot,
    ) -> Box<dyn TemplateComposer> {
        let fetcher = ValidatingContentFetcher::new(
            self.client.clone(),
            path_arguments,
            session.clone(),
            self.fetch_timeout,
        );
        Box::new(Composer::new(
            Box::new(fetcher),
            session,
            self.markup.clone(),
            self.max_recursion,
        ))
    }
}

/// Composes documents by recursively resolving include markers.
pub struct Composer {
    fetcher: RecursionAwareFetcher,
    session: SessionRoot,
    markup: MarkupNames,
}

impl Composer {
    pub fn new(
        fetcher: Box<dyn ContentFetcher>,
        session: SessionRoot,
        markup: MarkupNames,
        max_recursion: usize,
    ) -> Self {
        Self {
            fetcher: RecursionAwareFetcher::new(fetcher, max_recursion),
            session,
            markup,
        }
    }

    /// Treats the whole response body as the top-level document: resolves
    /// all includes, folds in the response's own session fragment, extracts
    /// the final text and pairs it with the merged session.
    pub async fn compose_template(
        &self,
        response: Response<String>,
        template_path: &str,
    ) -> ResponseWithSession<String> {
        let (parts, body) = response.into_parts();
        let parsed = scan(&body, ContentRange::all_up_to(body.len()), &self.markup);
        let composition = self
            .resolve(body, parsed, CompositionStep::root(template_path))
            .await
            .with_session(SessionFragment::from_headers(&parts.headers));

        let mut response = Response::new(composition.extract());
        response.headers_mut().insert(header::CACHE_CONTROL, NO_STORE);

        let session = self.session.merged_with(composition.session());
        ResponseWithSession::new(response, session)
    }

    /// Treats the response body as a nested fragment. Same pipeline as
    /// [`Composer::compose_template`] but returns the unextracted
    /// [`Composition`] so the parent can splice it into its own tree.
    pub async fn compose_content(
        &self,
        response: Response<String>,
        step: CompositionStep,
    ) -> Composition {
        let (parts, body) = response.into_parts();
        let parsed = scan(&body, ContentRange::empty(), &self.markup);
        self.resolve(body, parsed, step)
            .await
            .with_session(SessionFragment::from_headers(&parts.headers))
    }

    /// Resolves all includes of one document level. Boxed because the
    /// resolution of a fetched fragment recurses back through
    /// `compose_content`.
    fn resolve(
        &self,
        source: String,
        parsed: ParsedDocument,
        step: CompositionStep,
    ) -> BoxFuture<'_, Composition> {
        Box::pin(async move {
            let resolutions = parsed.includes.into_iter().map(|include| {
                let step = step.child(&include.path);
                async move {
                    let outcome = self
                        .fetcher
                        .fetch(&include.path, &include.fallback, &step)
                        .await;
                    match outcome {
                        Ok(response)
                            if response.status().is_success() && !response.body().is_empty() =>
                        {
                            let child = self.compose_content(response, step).await;
                            let fragment = child.session().clone();
                            (ResolvedInclude::new(include.range, child.extract()), fragment)
                        }
                        Ok(response) => {
                            tracing::debug!(
                                path = %include.path,
                                status = %response.status(),
                                "include unusable, substituting fallback"
                            );
                            (
                                ResolvedInclude::new(include.range, include.fallback),
                                SessionFragment::empty(),
                            )
                        }
                        Err(error) => {
                            tracing::warn!(
                                path = %include.path,
                                error = %error,
                                "include fetch failed, substituting fallback"
                            );
                            (
                                ResolvedInclude::new(include.range, include.fallback),
                                SessionFragment::empty(),
                            )
                        }
                    }
                }
            });

            // concurrent fan-out; join_all keeps document order for the merge
            let resolved = join_all(resolutions).await;

            let mut includes = Vec::with_capacity(resolved.len());
            let mut session = SessionFragment::empty();
            for (include, fragment) in resolved {
                includes.push(include);
                session = session.merged_with(&fragment);
            }
            Composition::new(source, parsed.content_range, includes).with_session(session)
        })
    }
}

impl TemplateComposer for Composer {
    fn compose_template<'a>(
        &'a self,
        response: Response<String>,
        template_path: &'a str,
    ) -> BoxFuture<'a, ResponseWithSession<String>> {
        Box::pin(Composer::compose_template(self, response, template_path))
    }
}
