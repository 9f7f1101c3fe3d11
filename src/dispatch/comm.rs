//! Process-group abstraction: a fixed set of rank-addressed workers
//! exchanging byte messages with the master. Workers are threads joined at
//! shutdown; each rank gets its own command and reply channel, so dispatch
//! and gather traffic can never collide (the channels stand in for
//! distinct message tags).

use crate::dispatch::controller::worker_loop;
use crate::error::{Result, TreegpError};
use crate::function::TargetFunction;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;

/// Master-to-worker messages. One broadcast header then one dispatch
/// payload per generation; `Shutdown` ends the worker loop.
pub enum WorkerMessage {
    Broadcast(Vec<u8>),
    Dispatch(Vec<u8>),
    Shutdown,
}

/// The group of worker ranks 1..N. Rank 0 is the master and runs its own
/// worker role inline, so no thread is spawned for it.
pub struct ProcessGroup {
    commands: Vec<Sender<WorkerMessage>>,
    replies: Vec<Receiver<Vec<u8>>>,
    handles: Vec<JoinHandle<Result<()>>>,
}

impl ProcessGroup {
    /// Spawns `ranks - 1` worker threads. With `ranks == 1` the group is
    /// empty and every call below is a no-op.
    pub fn spawn(ranks: usize, function: TargetFunction) -> Result<Self> {
        let mut commands = Vec::with_capacity(ranks.saturating_sub(1));
        let mut replies = Vec::with_capacity(ranks.saturating_sub(1));
        let mut handles = Vec::with_capacity(ranks.saturating_sub(1));

        for rank in 1..ranks {
            let (command_tx, command_rx) = channel::<WorkerMessage>();
            let (reply_tx, reply_rx) = channel::<Vec<u8>>();
            let handle = std::thread::Builder::new()
                .name(format!("treegp-worker-{rank}"))
                .spawn(move || worker_loop(rank, command_rx, reply_tx, function))?;

            commands.push(command_tx);
            replies.push(reply_rx);
            handles.push(handle);
        }

        Ok(Self {
            commands,
            replies,
            handles,
        })
    }

    /// Number of ranks including the master.
    pub fn ranks(&self) -> usize {
        self.commands.len() + 1
    }

    /// Sends the generation header to every worker rank.
    pub fn broadcast(&self, header: &[u8]) -> Result<()> {
        for (i, command) in self.commands.iter().enumerate() {
            command
                .send(WorkerMessage::Broadcast(header.to_vec()))
                .map_err(|_| disconnected(i + 1))?;
        }
        Ok(())
    }

    /// Point-to-point payload dispatch to one worker rank.
    pub fn send_payload(&self, rank: usize, payload: Vec<u8>) -> Result<()> {
        self.commands[rank - 1]
            .send(WorkerMessage::Dispatch(payload))
            .map_err(|_| disconnected(rank))
    }

    /// Blocking receive of one fitness message from the given rank.
    pub fn recv_fitness(&self, rank: usize) -> Result<Vec<u8>> {
        self.replies[rank - 1].recv().map_err(|_| disconnected(rank))
    }

    /// Stops every worker and joins its thread, surfacing the first worker
    /// error encountered.
    pub fn shutdown(self) -> Result<()> {
        for command in &self.commands {
            // A worker that already exited on error has hung up; join below
            // reports why.
            let _ = command.send(WorkerMessage::Shutdown);
        }

        for (i, handle) in self.handles.into_iter().enumerate() {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => {
                    return Err(TreegpError::Protocol(format!(
                        "Worker {} panicked",
                        i + 1
                    )))
                }
            }
        }
        Ok(())
    }
}

fn disconnected(rank: usize) -> TreegpError {
    TreegpError::Protocol(format!("Worker {rank} disconnected"))
}
