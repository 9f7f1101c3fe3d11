//! Per-generation dispatch cycle: the master partitions the population,
//! broadcasts the generation header, sends each rank its payload, performs
//! its own worker role inline through the same decode path, then gathers
//! fitness vectors in rank order and translates local positions back to
//! global population indices.

use crate::dispatch::comm::{ProcessGroup, WorkerMessage};
use crate::dispatch::protocol::{
    decode_fitness, decode_payload, encode_fitness, encode_payload, global_index, partition,
    payload_len, Header,
};
use crate::engine::evaluation::{evaluate_slice, SampleSet};
use crate::engine::population::Population;
use crate::error::{Result, TreegpError};
use crate::function::TargetFunction;
use log::debug;
use std::sync::mpsc::{Receiver, Sender};

/// Worker-side loop, one iteration per generation: receive the broadcast
/// header, receive the payload, regenerate the shared sample set from the
/// header seed, score the assigned expressions, reply with the fitness
/// vector. Blocks between generations; `Shutdown` ends the loop.
pub fn worker_loop(
    rank: usize,
    commands: Receiver<WorkerMessage>,
    replies: Sender<Vec<u8>>,
    function: TargetFunction,
) -> Result<()> {
    loop {
        let header = match commands.recv().map_err(|_| master_gone(rank))? {
            WorkerMessage::Shutdown => return Ok(()),
            WorkerMessage::Broadcast(bytes) => Header::decode(&bytes)?,
            WorkerMessage::Dispatch(_) => {
                return Err(TreegpError::Protocol(format!(
                    "Worker {rank} got a payload before the generation header"
                )))
            }
        };

        let payload = match commands.recv().map_err(|_| master_gone(rank))? {
            WorkerMessage::Dispatch(bytes) => bytes,
            _ => {
                return Err(TreegpError::Protocol(format!(
                    "Worker {rank} expected a payload after the header"
                )))
            }
        };

        let rpns = decode_payload(&payload, header.max_len as usize)?;
        debug!("worker {rank}: evaluating {} individuals", rpns.len());

        let samples = SampleSet::generate(header.seed, function);
        let fitness = evaluate_slice(&rpns, &samples)?;
        replies
            .send(encode_fitness(&fitness))
            .map_err(|_| master_gone(rank))?;
    }
}

fn master_gone(rank: usize) -> TreegpError {
    TreegpError::Protocol(format!("Worker {rank}: master disconnected"))
}

/// Master-side controller for the distributed evaluation round.
pub struct DispatchController {
    group: ProcessGroup,
    function: TargetFunction,
}

impl DispatchController {
    pub fn new(ranks: usize, function: TargetFunction) -> Result<Self> {
        Ok(Self {
            group: ProcessGroup::spawn(ranks, function)?,
            function,
        })
    }

    /// Runs one generation's evaluation: partition, broadcast, dispatch,
    /// local evaluation, gather, and fitness assignment. On return every
    /// individual in the population carries its new fitness.
    pub fn evaluate_generation(&self, population: &mut Population, seed: u32) -> Result<()> {
        let ranks = self.group.ranks();
        let slice_sizes = partition(population.len(), ranks);

        // Payload build: each rank's slice of RPN strings, and the widest
        // encoded payload, which sizes every rank's receive buffer.
        let mut offset = 0;
        let mut assignments = Vec::with_capacity(ranks);
        for &size in &slice_sizes {
            assignments.push(population.rpn_strings(offset, size));
            offset += size;
        }
        let max_len = assignments
            .iter()
            .map(|rpns| payload_len(rpns))
            .max()
            .unwrap_or(1);

        let header = Header {
            seed,
            max_len: max_len as i32,
        };
        self.group.broadcast(&header.encode())?;

        for rank in 1..ranks {
            self.group
                .send_payload(rank, encode_payload(&assignments[rank], max_len)?)?;
        }

        // The master's own worker role: encode and decode its payload
        // through the same code path the workers use.
        let own_payload = encode_payload(&assignments[0], max_len)?;
        let own_rpns = decode_payload(&own_payload, max_len)?;
        let samples = SampleSet::generate(seed, self.function);
        let own_fitness = evaluate_slice(&own_rpns, &samples)?;
        if own_fitness.len() != slice_sizes[0] {
            return Err(TreegpError::Protocol(format!(
                "Rank 0 produced {} fitness values for a slice of {}",
                own_fitness.len(),
                slice_sizes[0]
            )));
        }

        // Gather in rank order; each reply must carry exactly the slice
        // size recorded at partition time.
        let mut gathered = Vec::with_capacity(ranks);
        gathered.push(own_fitness);
        for rank in 1..ranks {
            let bytes = self.group.recv_fitness(rank)?;
            gathered.push(decode_fitness(&bytes, slice_sizes[rank])?);
        }

        // Index translation back into the global population ordering.
        for (rank, fitness) in gathered.iter().enumerate() {
            for (local, &value) in fitness.iter().enumerate() {
                let global = global_index(&slice_sizes, rank, local);
                population.get_mut(global).set_fitness(value);
            }
        }

        Ok(())
    }

    pub fn shutdown(self) -> Result<()> {
        self.group.shutdown()
    }
}
