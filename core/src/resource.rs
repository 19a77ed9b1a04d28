//! Typed facades over simple (singleton) and list (collection) resources.
//!
//! # Design
//! `RemoteStorage` owns the endpoint and the transport; resources borrow it
//! and only add a name. Every call follows the same steps: build the
//! request with `engine::build_*`, send it, run `engine::parse_*`, and fold
//! any classified failure into an `Outcome` through `Outcome::capture`.
//! Facade callers therefore never see an `Err` for a documented status.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::classify::classify_exchange;
use crate::endpoint::{named, Endpoint};
use crate::engine;
use crate::error::StorageError;
use crate::http::{HttpRequest, HttpResponse};
use crate::outcome::Outcome;
use crate::transport::Transport;
use crate::types::{Args, Authorization, Cursor};

/// Entry point: a base endpoint, its credentials and a transport.
#[derive(Debug, Clone)]
pub struct RemoteStorage<T> {
    endpoint: Endpoint,
    transport: T,
}

impl<T: Transport> RemoteStorage<T> {
    pub fn new(base_endpoint: &str, authorization: Authorization, transport: T) -> Self {
        Self {
            endpoint: Endpoint::new(base_endpoint, authorization),
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// A singleton resource holding elements of type `E`.
    pub fn simple<E>(&self, name: &str) -> SimpleResource<'_, T, E> {
        SimpleResource {
            storage: self,
            name: name.to_string(),
            _element: PhantomData,
        }
    }

    /// A collection whose list projection decodes as `L` and whose
    /// individual elements decode as `E`.
    pub fn list<L, E>(&self, name: &str) -> ListResource<'_, T, L, E> {
        ListResource {
            storage: self,
            name: name.to_string(),
            _element: PhantomData,
        }
    }

    /// Send a built request, classify the exchange and parse its response.
    #[instrument(skip_all, fields(method = request.method.as_str(), url = %request.url))]
    fn execute<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(&HttpResponse) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let response = classify_exchange(self.transport.send(request))?;
        debug!(status = response.status, "storage call succeeded");
        parse(&response)
    }
}

mod sealed {
    use super::{RemoteStorage, Transport};

    /// Where a resource's named calls go. Only this crate's resources
    /// implement it.
    pub trait Target {
        type Transport: Transport;

        fn storage(&self) -> &RemoteStorage<Self::Transport>;

        /// URL that `~method` segments are appended to.
        fn target(&self) -> String;
    }
}

/// Named views and operations, shared by both resource shapes.
///
/// The `*_object` and `*_array` variants reject a success body of the other
/// JSON shape with `FormatError`.
pub trait NamedCalls: sealed::Target {
    /// Read-only call decoded into `R`.
    fn view_as<R: DeserializeOwned>(&self, method: &str, args: &Args) -> Outcome<R> {
        call_view(self.storage(), &named(&self.target(), method), args, |response| {
            engine::parse_call(response).map(Outcome::with_element)
        })
    }

    /// Read-only call returning the raw JSON document.
    fn view(&self, method: &str, args: &Args) -> Outcome<Value> {
        self.view_as(method, args)
    }

    /// Read-only call that must answer with a JSON object.
    fn view_object(&self, method: &str, args: &Args) -> Outcome<Map<String, Value>> {
        call_view(self.storage(), &named(&self.target(), method), args, |response| {
            engine::parse_call_object(response).map(Outcome::with_element)
        })
    }

    /// Read-only call that must answer with a JSON array, one element per
    /// entry.
    fn view_array(&self, method: &str, args: &Args) -> Outcome<Value> {
        call_view(self.storage(), &named(&self.target(), method), args, |response| {
            engine::parse_call_array(response).map(Outcome::with_elements)
        })
    }

    /// Read-write call with an optional body, decoded into `R`.
    fn operation_as<B, R>(&self, method: &str, args: &Args, body: Option<&B>) -> Outcome<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        call_operation(
            self.storage(),
            &named(&self.target(), method),
            args,
            body,
            |response| engine::parse_call(response).map(Outcome::with_element),
        )
    }

    /// Read-write call returning the raw JSON document.
    fn operation(&self, method: &str, args: &Args, body: Option<&Value>) -> Outcome<Value> {
        self.operation_as(method, args, body)
    }

    fn operation_object(
        &self,
        method: &str,
        args: &Args,
        body: Option<&Value>,
    ) -> Outcome<Map<String, Value>> {
        call_operation(
            self.storage(),
            &named(&self.target(), method),
            args,
            body,
            |response| engine::parse_call_object(response).map(Outcome::with_element),
        )
    }

    fn operation_array(&self, method: &str, args: &Args, body: Option<&Value>) -> Outcome<Value> {
        call_operation(
            self.storage(),
            &named(&self.target(), method),
            args,
            body,
            |response| engine::parse_call_array(response).map(Outcome::with_elements),
        )
    }
}

impl<N: sealed::Target> NamedCalls for N {}

fn call_view<T: Transport, R>(
    storage: &RemoteStorage<T>,
    url: &str,
    args: &Args,
    parse: impl FnOnce(&HttpResponse) -> Result<Outcome<R>, StorageError>,
) -> Outcome<R> {
    let request = engine::build_view(url, storage.endpoint.authorization(), args);
    Outcome::capture(storage.execute(request, parse))
}

fn call_operation<T, B, R>(
    storage: &RemoteStorage<T>,
    url: &str,
    args: &Args,
    body: Option<&B>,
    parse: impl FnOnce(&HttpResponse) -> Result<Outcome<R>, StorageError>,
) -> Outcome<R>
where
    T: Transport,
    B: Serialize + ?Sized,
{
    Outcome::capture(
        engine::build_operation(url, storage.endpoint.authorization(), args, body)
            .and_then(|request| storage.execute(request, parse)),
    )
}

fn call_create<T: Transport, E: Serialize>(
    storage: &RemoteStorage<T>,
    url: &str,
    body: &E,
) -> Outcome<E> {
    Outcome::capture(
        engine::build_create(url, storage.endpoint.authorization(), Some(body))
            .and_then(|request| storage.execute(request, engine::parse_create))
            .map(Outcome::created),
    )
}

fn call_read<T: Transport, E: DeserializeOwned>(storage: &RemoteStorage<T>, url: &str) -> Outcome<E> {
    let request = engine::build_read(url, storage.endpoint.authorization());
    Outcome::capture(
        storage
            .execute(request, engine::parse_read)
            .map(Outcome::with_element),
    )
}

fn call_update<T: Transport, E>(storage: &RemoteStorage<T>, url: &str, patch: &Value) -> Outcome<E> {
    Outcome::capture(
        engine::build_update(url, storage.endpoint.authorization(), patch)
            .and_then(|request| storage.execute(request, engine::parse_empty))
            .map(|()| Outcome::ok()),
    )
}

fn call_replace<T: Transport, E: Serialize>(
    storage: &RemoteStorage<T>,
    url: &str,
    replacement: &E,
) -> Outcome<E> {
    Outcome::capture(
        engine::build_replace(url, storage.endpoint.authorization(), replacement)
            .and_then(|request| storage.execute(request, engine::parse_empty))
            .map(|()| Outcome::ok()),
    )
}

fn call_delete<T: Transport, E>(storage: &RemoteStorage<T>, url: &str) -> Outcome<E> {
    let request = engine::build_delete(url, storage.endpoint.authorization());
    Outcome::capture(
        storage
            .execute(request, engine::parse_empty)
            .map(|()| Outcome::ok()),
    )
}

/// A singleton resource, addressed by name only.
#[derive(Debug)]
pub struct SimpleResource<'a, T, E> {
    storage: &'a RemoteStorage<T>,
    name: String,
    _element: PhantomData<fn() -> E>,
}

impl<T: Transport, E> SimpleResource<'_, T, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> String {
        self.storage.endpoint.collection(&self.name)
    }
}

impl<T, E> SimpleResource<'_, T, E>
where
    T: Transport,
    E: Serialize + DeserializeOwned,
{
    pub fn create(&self, body: &E) -> Outcome<E> {
        call_create(self.storage, &self.url(), body)
    }

    pub fn read(&self) -> Outcome<E> {
        call_read(self.storage, &self.url())
    }

    /// Apply a MongoDB-style update document, e.g. `{"$set": {...}}`.
    pub fn update(&self, patch: &Value) -> Outcome<E> {
        call_update(self.storage, &self.url(), patch)
    }

    pub fn replace(&self, replacement: &E) -> Outcome<E> {
        call_replace(self.storage, &self.url(), replacement)
    }

    pub fn delete(&self) -> Outcome<E> {
        call_delete(self.storage, &self.url())
    }
}

impl<T: Transport, E> sealed::Target for SimpleResource<'_, T, E> {
    type Transport = T;

    fn storage(&self) -> &RemoteStorage<T> {
        self.storage
    }

    fn target(&self) -> String {
        self.url()
    }
}

/// A collection resource: paged listing plus per-item calls by id.
#[derive(Debug)]
pub struct ListResource<'a, T, L, E> {
    storage: &'a RemoteStorage<T>,
    name: String,
    _element: PhantomData<fn() -> (L, E)>,
}

impl<T: Transport, L, E> ListResource<'_, T, L, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> String {
        self.storage.endpoint.collection(&self.name)
    }

    fn item_url(&self, id: &str) -> String {
        self.storage.endpoint.item(&self.name, id)
    }

    /// Read-only call on one item, decoded into `R`.
    pub fn item_view_as<R: DeserializeOwned>(&self, id: &str, method: &str, args: &Args) -> Outcome<R> {
        call_view(self.storage, &named(&self.item_url(id), method), args, |response| {
            engine::parse_call(response).map(Outcome::with_element)
        })
    }

    pub fn item_view(&self, id: &str, method: &str, args: &Args) -> Outcome<Value> {
        self.item_view_as(id, method, args)
    }

    /// Read-write call on one item, decoded into `R`.
    pub fn item_operation_as<B, R>(
        &self,
        id: &str,
        method: &str,
        args: &Args,
        body: Option<&B>,
    ) -> Outcome<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        call_operation(
            self.storage,
            &named(&self.item_url(id), method),
            args,
            body,
            |response| engine::parse_call(response).map(Outcome::with_element),
        )
    }

    pub fn item_operation(
        &self,
        id: &str,
        method: &str,
        args: &Args,
        body: Option<&Value>,
    ) -> Outcome<Value> {
        self.item_operation_as(id, method, args, body)
    }
}

impl<T, L, E> ListResource<'_, T, L, E>
where
    T: Transport,
    L: DeserializeOwned,
    E: Serialize + DeserializeOwned,
{
    pub fn list(&self, cursor: &Cursor) -> Outcome<L> {
        let request = engine::build_list(&self.url(), self.storage.endpoint.authorization(), cursor);
        Outcome::capture(
            self.storage
                .execute(request, engine::parse_list)
                .map(Outcome::with_elements),
        )
    }

    pub fn create(&self, body: &E) -> Outcome<E> {
        call_create(self.storage, &self.url(), body)
    }

    pub fn read(&self, id: &str) -> Outcome<E> {
        call_read(self.storage, &self.item_url(id))
    }

    /// Apply a MongoDB-style update document to one item.
    pub fn update(&self, id: &str, patch: &Value) -> Outcome<E> {
        call_update(self.storage, &self.item_url(id), patch)
    }

    pub fn replace(&self, id: &str, replacement: &E) -> Outcome<E> {
        call_replace(self.storage, &self.item_url(id), replacement)
    }

    pub fn delete(&self, id: &str) -> Outcome<E> {
        call_delete(self.storage, &self.item_url(id))
    }
}

impl<T: Transport, L, E> sealed::Target for ListResource<'_, T, L, E> {
    type Transport = T;

    fn storage(&self) -> &RemoteStorage<T> {
        self.storage
    }

    fn target(&self) -> String {
        self.url()
    }
}
