mod collection_group_test;
