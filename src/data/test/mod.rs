mod relation;
