mod aptos_node;
mod router;
