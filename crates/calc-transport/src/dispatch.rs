//! Request dispatch with per-connection resource ownership.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use calc_core::{Arithmetic, CalcError, Handle, NumberSink, SequenceKind, WrappingArithmetic};
use calc_engine::GenerateOutcome;
use calc_session::Calculator;

use crate::{
    config::HostConfig,
    protocol::{Request, Response},
};

/// Kind of resource a handle addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    Session,
    Stream,
}

#[derive(Default)]
struct Owned {
    sessions: BTreeSet<Handle>,
    streams: BTreeSet<Handle>,
}

impl Owned {
    fn set(&mut self, resource: Resource) -> &mut BTreeSet<Handle> {
        match resource {
            Resource::Session => &mut self.sessions,
            Resource::Stream => &mut self.streams,
        }
    }
}

/// Forwards generator output as `number`/`done` responses.
struct ResponseSink<'a, F> {
    emit: &'a mut F,
}

impl<F: FnMut(Response) -> bool> NumberSink for ResponseSink<'_, F> {
    fn on_number(&mut self, value: u32) -> bool {
        (self.emit)(Response::Number { value })
    }

    fn on_done(&mut self) {
        (self.emit)(Response::Done);
    }
}

/// One host connection to a shared [`Calculator`].
///
/// A connection can only address handles it created. Whatever it still owns
/// when dropped is destroyed, like resources of a dropped component instance.
///
/// `count` and `max_count` above the connection's batch limit are rejected
/// before any value is produced.
pub struct Connection<A: Arithmetic = WrappingArithmetic> {
    calculator: Arc<Calculator<A>>,
    owned: Mutex<Owned>,
    max_batch: u32,
}

impl<A: Arithmetic> Connection<A> {
    /// Open a connection with the default batch limit.
    #[must_use]
    pub fn new(calculator: Arc<Calculator<A>>) -> Self {
        Self::with_max_batch(calculator, HostConfig::DEFAULT_MAX_BATCH)
    }

    /// Open a connection that rejects reads and generators above `max_batch`.
    #[must_use]
    pub fn with_max_batch(calculator: Arc<Calculator<A>>, max_batch: u32) -> Self {
        Self {
            calculator,
            owned: Mutex::new(Owned::default()),
            max_batch,
        }
    }

    fn owned(&self) -> MutexGuard<'_, Owned> {
        self.owned.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle one request.
    ///
    /// `emit` receives every response; generators emit one `number` per
    /// value and a final `done`. Returning `false` from `emit` cancels a
    /// running generator.
    pub fn handle<F>(&self, request: Request, mut emit: F)
    where
        F: FnMut(Response) -> bool,
    {
        let calc = self.calculator.as_ref();
        let response = match request {
            Request::EvalExpression { op, x, y } => Response::Text {
                value: calc.evaluator().eval_tag(&op, x, y),
            },
            Request::EvalExpressionDetailed { op, x, y } => Response::Detailed {
                result: calc.evaluator().eval_tag_detailed(&op, x, y),
            },
            Request::GenerateFibonacci { max_count } => {
                return self.generate(SequenceKind::Fibonacci, max_count, &mut emit);
            }
            Request::GenerateSquares { max_count } => {
                return self.generate(SequenceKind::Squares, max_count, &mut emit);
            }
            Request::GeneratePrimes { max_count } => {
                return self.generate(SequenceKind::Primes, max_count, &mut emit);
            }
            Request::SessionCreate => self.create(Resource::Session),
            Request::SessionPushOp { handle, op, value } => {
                self.ack(Resource::Session, handle, |c| c.session_push_op(handle, op, value))
            }
            Request::SessionGetCurrent { handle } => respond(
                self.owned_call(Resource::Session, handle, |c| c.session_get_current(handle)),
                |value| Response::Current { value },
            ),
            Request::SessionGetHistory { handle } => respond(
                self.owned_call(Resource::Session, handle, |c| c.session_get_history(handle)),
                |entries| Response::History { entries },
            ),
            Request::SessionReset { handle } => {
                self.ack(Resource::Session, handle, |c| c.session_reset(handle))
            }
            Request::SessionDestroy { handle } => self.destroy(Resource::Session, handle),
            Request::StreamCreate => self.create(Resource::Stream),
            Request::StreamStartFibonacci { handle } => self.ack(Resource::Stream, handle, |c| {
                c.stream_start(handle, SequenceKind::Fibonacci)
            }),
            Request::StreamStartSquares { handle } => self.ack(Resource::Stream, handle, |c| {
                c.stream_start(handle, SequenceKind::Squares)
            }),
            Request::StreamStartPrimes { handle } => self.ack(Resource::Stream, handle, |c| {
                c.stream_start(handle, SequenceKind::Primes)
            }),
            Request::StreamRead { count, .. } if count > self.max_batch => {
                self.over_limit("count", count)
            }
            Request::StreamRead { handle, count } => respond(
                self.owned_call(Resource::Stream, handle, |c| c.stream_read(handle, count)),
                |values| Response::Numbers { values },
            ),
            Request::StreamStop { handle } => {
                self.ack(Resource::Stream, handle, |c| c.stream_stop(handle))
            }
            Request::StreamDestroy { handle } => self.destroy(Resource::Stream, handle),
            Request::Ping => Response::Pong,
        };
        emit(response);
    }

    fn generate<F>(&self, kind: SequenceKind, max_count: u32, emit: &mut F)
    where
        F: FnMut(Response) -> bool,
    {
        if max_count > self.max_batch {
            emit(self.over_limit("max_count", max_count));
            return;
        }
        let outcome: GenerateOutcome = calc_engine::generate(kind, max_count, ResponseSink { emit });
        if outcome.cancelled {
            tracing::debug!(%kind, emitted = outcome.emitted, "generator cancelled by host");
        }
    }

    fn over_limit(&self, field: &str, requested: u32) -> Response {
        tracing::warn!(field, requested, max_batch = self.max_batch, "batch limit exceeded");
        Response::invalid_request(format!(
            "{field} {requested} exceeds the batch limit of {}",
            self.max_batch
        ))
    }

    fn create(&self, resource: Resource) -> Response {
        let created = match resource {
            Resource::Session => self.calculator.session_new(),
            Resource::Stream => self.calculator.stream_new(),
        };
        respond(created, |handle| {
            self.owned().set(resource).insert(handle);
            Response::Handle { handle }
        })
    }

    fn destroy(&self, resource: Resource, handle: Handle) -> Response {
        let mut owned = self.owned();
        if !owned.set(resource).contains(&handle) {
            return CalcError::HandleNotFound(handle).into();
        }
        let destroyed = match resource {
            Resource::Session => self.calculator.session_drop(handle),
            Resource::Stream => self.calculator.stream_drop(handle),
        };
        owned.set(resource).remove(&handle);
        respond(destroyed, |()| Response::Ack)
    }

    fn owned_call<T>(
        &self,
        resource: Resource,
        handle: Handle,
        f: impl FnOnce(&Calculator<A>) -> Result<T, CalcError>,
    ) -> Result<T, CalcError> {
        if !self.owned().set(resource).contains(&handle) {
            tracing::warn!(?resource, %handle, "handle not owned by this connection");
            return Err(CalcError::HandleNotFound(handle));
        }
        f(self.calculator.as_ref())
    }

    fn ack(
        &self,
        resource: Resource,
        handle: Handle,
        f: impl FnOnce(&Calculator<A>) -> Result<(), CalcError>,
    ) -> Response {
        respond(self.owned_call(resource, handle, f), |()| Response::Ack)
    }

    /// Number of live handles this connection owns.
    #[must_use]
    pub fn owned_count(&self) -> usize {
        let owned = self.owned();
        owned.sessions.len() + owned.streams.len()
    }

    /// Destroy every handle this connection still owns. Returns how many.
    pub fn close(&self) -> usize {
        let Owned { sessions, streams } = std::mem::take(&mut *self.owned());
        let count = sessions.len() + streams.len();
        for handle in sessions {
            if let Err(e) = self.calculator.session_drop(handle) {
                tracing::warn!("Failed to drop session on close: {e}");
            }
        }
        for handle in streams {
            if let Err(e) = self.calculator.stream_drop(handle) {
                tracing::warn!("Failed to drop stream on close: {e}");
            }
        }
        if count > 0 {
            tracing::debug!(count, "released connection handles");
        }
        count
    }
}

impl<A: Arithmetic> Drop for Connection<A> {
    fn drop(&mut self) {
        self.close();
    }
}

fn respond<T>(result: Result<T, CalcError>, ok: impl FnOnce(T) -> Response) -> Response {
    result.map_or_else(Response::from, ok)
}

#[cfg(test)]
mod tests {
    use calc_core::{CalcResult, OpTag};

    use super::*;
    use crate::protocol::ErrorKind;

    fn run<A: Arithmetic>(conn: &Connection<A>, request: Request) -> Vec<Response> {
        let mut out = Vec::new();
        conn.handle(request, |r| {
            out.push(r);
            true
        });
        out
    }

    fn run_one<A: Arithmetic>(conn: &Connection<A>, request: Request) -> Response {
        let mut out = run(conn, request);
        assert_eq!(out.len(), 1, "{out:?}");
        out.remove(0)
    }

    fn created(response: Response) -> Handle {
        match response {
            Response::Handle { handle } => handle,
            other => panic!("expected handle, got {other:?}"),
        }
    }

    fn connection() -> (Arc<Calculator>, Connection) {
        let calc = Arc::new(Calculator::default());
        let conn = Connection::new(Arc::clone(&calc));
        (calc, conn)
    }

    #[test]
    fn test_eval_requests() {
        let (_, conn) = connection();
        assert_eq!(
            run_one(
                &conn,
                Request::EvalExpression {
                    op: "add".to_string(),
                    x: 1,
                    y: 2
                }
            ),
            Response::Text {
                value: "the operation of 1 add 2 = 3".to_string()
            }
        );
        assert_eq!(
            run_one(
                &conn,
                Request::EvalExpressionDetailed {
                    op: "pow".to_string(),
                    x: 2,
                    y: 3
                }
            ),
            Response::Detailed {
                result: CalcResult::unknown(2, 3)
            }
        );
    }

    #[test]
    fn test_generator_streams_numbers_then_done() {
        let (_, conn) = connection();
        let out = run(&conn, Request::GenerateSquares { max_count: 3 });
        assert_eq!(
            out,
            [
                Response::Number { value: 1 },
                Response::Number { value: 4 },
                Response::Number { value: 9 },
                Response::Done
            ]
        );
    }

    #[test]
    fn test_closed_receiver_cancels_generator() {
        let (_, conn) = connection();
        let mut out = Vec::new();
        conn.handle(Request::GeneratePrimes { max_count: 1000 }, |r| {
            out.push(r);
            out.len() < 2
        });
        assert_eq!(
            out,
            [
                Response::Number { value: 2 },
                Response::Number { value: 3 },
                Response::Done
            ]
        );
    }

    #[test]
    fn test_session_round_trip() {
        let (_, conn) = connection();
        let h = created(run_one(&conn, Request::SessionCreate));
        for (op, value) in [(OpTag::Add, 10), (OpTag::Mul, 3), (OpTag::Sub, 5)] {
            assert_eq!(
                run_one(&conn, Request::SessionPushOp { handle: h, op, value }),
                Response::Ack
            );
        }
        assert_eq!(
            run_one(&conn, Request::SessionGetCurrent { handle: h }),
            Response::Current { value: 25 }
        );
        let Response::History { entries } =
            run_one(&conn, Request::SessionGetHistory { handle: h })
        else {
            panic!("expected history");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].op, "sub");

        assert_eq!(run_one(&conn, Request::SessionReset { handle: h }), Response::Ack);
        assert_eq!(
            run_one(&conn, Request::SessionGetCurrent { handle: h }),
            Response::Current { value: 0 }
        );
    }

    #[test]
    fn test_stream_round_trip() {
        let (_, conn) = connection();
        let h = created(run_one(&conn, Request::StreamCreate));
        run_one(&conn, Request::StreamStartFibonacci { handle: h });
        assert_eq!(
            run_one(&conn, Request::StreamRead { handle: h, count: 5 }),
            Response::Numbers {
                values: vec![1, 1, 2, 3, 5]
            }
        );
        run_one(&conn, Request::StreamStop { handle: h });
        assert_eq!(
            run_one(&conn, Request::StreamRead { handle: h, count: 5 }),
            Response::Numbers { values: vec![] }
        );
    }

    #[test]
    fn test_destroyed_handle_reports_not_found() {
        let (_, conn) = connection();
        let h = created(run_one(&conn, Request::StreamCreate));
        assert_eq!(run_one(&conn, Request::StreamDestroy { handle: h }), Response::Ack);

        let response = run_one(&conn, Request::StreamRead { handle: h, count: 1 });
        assert!(matches!(
            response,
            Response::Error {
                kind: ErrorKind::HandleNotFound,
                ..
            }
        ));
        assert_eq!(conn.owned_count(), 0);
    }

    #[test]
    fn test_connections_cannot_share_handles() {
        let (calc, first) = connection();
        let second = Connection::new(Arc::clone(&calc));
        let h = created(run_one(&first, Request::SessionCreate));

        let response = run_one(&second, Request::SessionGetCurrent { handle: h });
        assert!(matches!(
            response,
            Response::Error {
                kind: ErrorKind::HandleNotFound,
                ..
            }
        ));
        assert_eq!(calc.session_get_current(h), Ok(0));
    }

    #[test]
    fn test_batch_limit_rejects_large_requests() {
        let calc = Arc::new(Calculator::default());
        let conn = Connection::with_max_batch(Arc::clone(&calc), 4);
        let h = created(run_one(&conn, Request::StreamCreate));
        run_one(&conn, Request::StreamStartSquares { handle: h });

        for request in [
            Request::GenerateSquares {
                max_count: u32::MAX,
            },
            Request::GenerateFibonacci { max_count: 5 },
            Request::StreamRead {
                handle: h,
                count: u32::MAX,
            },
        ] {
            assert!(matches!(
                run_one(&conn, request),
                Response::Error {
                    kind: ErrorKind::InvalidRequest,
                    ..
                }
            ));
        }

        // A rejected read leaves the stream where it was.
        assert_eq!(
            run_one(&conn, Request::StreamRead { handle: h, count: 4 }),
            Response::Numbers {
                values: vec![1, 4, 9, 16]
            }
        );
        assert_eq!(run(&conn, Request::GeneratePrimes { max_count: 4 }).len(), 5);
    }

    #[test]
    fn test_drop_releases_owned_handles() {
        let (calc, conn) = connection();
        created(run_one(&conn, Request::SessionCreate));
        created(run_one(&conn, Request::StreamCreate));
        created(run_one(&conn, Request::StreamCreate));
        assert_eq!(conn.owned_count(), 3);

        drop(conn);
        assert!(calc.sessions().is_empty());
        assert!(calc.streams().is_empty());
    }
}
